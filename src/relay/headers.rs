//! Header plumbing around the policy engine.
//!
//! Hop-by-hop headers describe a single connection and are removed in both
//! directions. The inbound `Host` names the relay, not the target, so it is
//! dropped before dispatch. Relayed responses get a permissive CORS header.

use std::sync::LazyLock;

use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONNECTION, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

const ACCESS_CONTROL_ALLOW_ORIGIN_ANY: &str = "*";

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
        "proxy-connection",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Remove the fixed hop-by-hop set plus any header the `Connection` value
/// names as connection-specific.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| token.trim().parse::<HeaderName>().ok())
        .collect();
    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Drop the inbound `Host`. The client fills it in from the request URI,
/// which stays correct across redirect hops to other hosts.
pub fn clear_host(headers: &mut HeaderMap) {
    headers.remove(HOST);
}

/// Force `Access-Control-Allow-Origin: *`, replacing any upstream value.
pub fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ACCESS_CONTROL_ALLOW_ORIGIN_ANY),
    );
}
