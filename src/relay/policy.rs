//! Per-hostname request header rewriting.
//!
//! A [`PolicyTable`] maps exact target hostnames to a [`RuleSet`] and always
//! carries a wildcard rule set for every other host, so lookup cannot fail.
//! Each rule names one header and a [`HeaderAction`]. The built-in table
//! ([`BUILTIN`]) is initialised once and never changes afterwards.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use axum::http::header::{ORIGIN, REFERER};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use super::interpret::OutboundRequest;

pub const WILDCARD: &str = "*";

const PIXIV_REFERER: &str = "https://www.pixiv.net/";

/// The compiled-in header policy, shared by every server state.
pub static BUILTIN: LazyLock<Arc<PolicyTable>> =
    LazyLock::new(|| Arc::new(PolicyTable::builtin()));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    Keep,
    Delete,
    Set(HeaderValue),
}

impl HeaderAction {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Delete => "delete",
            Self::Set(_) => "set",
        }
    }

    fn apply(&self, name: &HeaderName, headers: &mut HeaderMap) {
        match self {
            Self::Keep => {}
            Self::Delete => {
                headers.remove(name);
            }
            Self::Set(value) => {
                headers.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Ordered header name to action mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<(HeaderName, HeaderAction)>,
}

impl RuleSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule. A name that is already present keeps its position and
    /// takes the new action.
    #[must_use]
    pub fn rule(mut self, name: HeaderName, action: HeaderAction) -> Self {
        if let Some(existing) = self.rules.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = action;
        } else {
            self.rules.push((name, action));
        }
        self
    }

    #[must_use]
    pub fn keep(self, name: HeaderName) -> Self {
        self.rule(name, HeaderAction::Keep)
    }

    #[must_use]
    pub fn delete(self, name: HeaderName) -> Self {
        self.rule(name, HeaderAction::Delete)
    }

    #[must_use]
    pub fn set(self, name: HeaderName, value: HeaderValue) -> Self {
        self.rule(name, HeaderAction::Set(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderAction)> {
        self.rules.iter().map(|(name, action)| (name, action))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    // Pairs with `len` for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, action) in &self.rules {
            action.apply(name, headers);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyTable {
    hosts: HashMap<String, RuleSet>,
    wildcard: RuleSet,
}

impl PolicyTable {
    #[must_use]
    pub fn new(wildcard: RuleSet) -> Self {
        Self {
            hosts: HashMap::new(),
            wildcard,
        }
    }

    /// Register rules for an exact hostname. Hosts are compared in their
    /// parsed (lowercase) form, so the key is lowercased here too.
    #[must_use]
    pub fn with_host(mut self, host: &str, rules: RuleSet) -> Self {
        self.hosts.insert(host.to_ascii_lowercase(), rules);
        self
    }

    #[must_use]
    pub fn builtin() -> Self {
        let pixiv = RuleSet::new()
            .delete(ORIGIN)
            .set(REFERER, HeaderValue::from_static(PIXIV_REFERER));

        Self::new(RuleSet::new().delete(ORIGIN).delete(REFERER))
            .with_host("i.pximg.net", pixiv.clone())
            .with_host("i-cf.pximg.net", pixiv)
    }

    #[must_use]
    pub fn rules_for(&self, host: &str) -> &RuleSet {
        self.hosts.get(host).unwrap_or(&self.wildcard)
    }

    #[must_use]
    pub const fn wildcard(&self) -> &RuleSet {
        &self.wildcard
    }

    /// All entries, exact hosts sorted by name, wildcard last.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &RuleSet)> {
        let mut entries: Vec<(&str, &RuleSet)> = self
            .hosts
            .iter()
            .map(|(host, rules)| (host.as_str(), rules))
            .collect();
        entries.sort_by_key(|(host, _)| *host);
        entries.push((WILDCARD, &self.wildcard));
        entries
    }

    pub fn apply(&self, request: &mut OutboundRequest) {
        let host = request.target.host_str().unwrap_or_default();
        let rules = self.rules_for(host);
        tracing::debug!(host = %host, rules = rules.len(), "applying header policy");
        rules.apply(&mut request.headers);
    }
}
