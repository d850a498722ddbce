//! Reconstruction of the embedded target URL from an inbound request URI.
//!
//! The inbound path carries the whole target (`/https://host/path`). The
//! relay defines no query parameters of its own, so the inbound query and
//! fragment are handed to the target unchanged. Percent-encoding is left
//! untouched: nothing here decodes the path.

use url::Url;

use crate::error::RelayError;

/// Whether the path addresses the relay itself rather than a target.
#[must_use]
pub fn is_usage_path(path: &str) -> bool {
    path == "/"
}

/// Rebuild the literal target string from its inbound parts.
///
/// Empty query and fragment components are dropped, so `/x?` and `/x`
/// produce the same string.
#[must_use]
pub fn target_string(path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
    let mut target = path.strip_prefix('/').unwrap_or(path).to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Parse the embedded target as an absolute `http` or `https` URL.
pub fn reconstruct_target(
    path: &str,
    query: Option<&str>,
    fragment: Option<&str>,
) -> Result<Url, RelayError> {
    let input = target_string(path, query, fragment);
    let url = Url::parse(&input).map_err(|e| RelayError::InvalidTargetUrl {
        input: input.clone(),
        source: Box::new(e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}
