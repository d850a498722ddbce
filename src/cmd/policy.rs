//! `urlrelay policy` — print the compiled-in header policy.
//!
//! Lists every hostname entry (wildcard last) with its header rules, or
//! only the rule set a given target hostname resolves to. Output is
//! human-readable text or JSON.

use serde::Serialize;

use crate::cli::{PolicyArgs, PolicyFormat};
use crate::relay::policy::{HeaderAction, PolicyTable, RuleSet, BUILTIN};

#[derive(Debug, Serialize)]
pub struct PolicyEntry {
    pub host: String,
    pub rules: Vec<RuleView>,
}

#[derive(Debug, Serialize)]
pub struct RuleView {
    pub header: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn entry(host: &str, rules: &RuleSet) -> PolicyEntry {
    PolicyEntry {
        host: host.to_string(),
        rules: rules
            .iter()
            .map(|(name, action)| RuleView {
                header: name.as_str().to_string(),
                action: action.label(),
                value: match action {
                    HeaderAction::Set(value) => {
                        Some(String::from_utf8_lossy(value.as_bytes()).into_owned())
                    }
                    HeaderAction::Keep | HeaderAction::Delete => None,
                },
            })
            .collect(),
    }
}

/// Entries to report: the whole table, or what `host` resolves to.
#[must_use]
pub fn report(table: &PolicyTable, host: Option<&str>) -> Vec<PolicyEntry> {
    match host {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            vec![entry(&host, table.rules_for(&host))]
        }
        None => table
            .entries()
            .into_iter()
            .map(|(host, rules)| entry(host, rules))
            .collect(),
    }
}

#[must_use]
pub fn format_text(entries: &[PolicyEntry]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for entry in entries {
        // write! to String is infallible
        let _ = writeln!(buf, "{}", entry.host);
        for rule in &entry.rules {
            match &rule.value {
                Some(value) => {
                    let _ = writeln!(buf, "  {:<16} {} {value}", rule.header, rule.action);
                }
                None => {
                    let _ = writeln!(buf, "  {:<16} {}", rule.header, rule.action);
                }
            }
        }
    }
    buf
}

pub fn execute(args: &PolicyArgs) {
    let entries = report(&BUILTIN, args.host.as_deref());

    match args.format {
        PolicyFormat::Text => print!("{}", format_text(&entries)),
        PolicyFormat::Json => println!("{}", serde_json::json!({ "entries": entries })),
    }
}
