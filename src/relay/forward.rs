//! Dispatch of the outbound request and relay of the upstream response.
//!
//! The client follows redirects itself. A redirect it cannot follow (a
//! 307/308 carrying a streamed body) is relayed with its `Location` pointed
//! back through the relay, so the caller's next request still goes to the
//! right upstream. Status, reason phrase, headers and body pass through as
//! they arrived; the body is streamed, not collected. No retries and no
//! timeouts beyond what the connector itself applies.

use std::time::Instant;

use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::follow_redirect::RequestUri;
use url::Url;

use super::headers;
use super::interpret::OutboundRequest;
use crate::error::RelayError;
use crate::server::RelayClient;

pub async fn forward(
    client: &RelayClient,
    outbound: OutboundRequest,
    request_id: &str,
) -> Result<Response, RelayError> {
    let target_url = outbound.target.clone();
    let target = target_url.to_string();
    let request = outbound.into_http()?;

    let start = Instant::now();
    let upstream = client
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| RelayError::Dispatch {
            target: target.clone(),
            source: Box::new(e),
        })?;

    #[allow(clippy::cast_possible_truncation)]
    let latency_ms = start.elapsed().as_millis() as u64;
    let final_uri = upstream
        .extensions()
        .get::<RequestUri>()
        .map_or_else(|| target.clone(), |uri| uri.0.to_string());

    tracing::info!(
        request_id = %request_id,
        target = %target,
        final_url = %final_uri,
        status = upstream.status().as_u16(),
        latency_ms,
        "upstream responded"
    );

    let (parts, body) = upstream.into_parts();
    let mut response = Response::from_parts(parts, Body::new(body));
    relay_headers(response.headers_mut());

    if response.status().is_redirection() {
        let base = Url::parse(&final_uri).unwrap_or(target_url);
        if let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| relay_location(&base, value))
        {
            tracing::debug!(
                request_id = %request_id,
                location = ?location,
                "rewrote redirect location"
            );
            response.headers_mut().insert(LOCATION, location);
        }
    }

    Ok(response)
}

/// Prepare upstream response headers for the caller.
pub fn relay_headers(headers: &mut HeaderMap) {
    headers::strip_hop_by_hop(headers);
    headers::allow_any_origin(headers);
}

/// Resolve an upstream `Location` against the URL that sent it and express
/// it in relay form, `/<absolute url>`. Locations that do not resolve to an
/// http(s) URL are left alone.
#[must_use]
pub fn relay_location(base: &Url, location: &HeaderValue) -> Option<HeaderValue> {
    let location = location.to_str().ok()?;
    let absolute = base.join(location).ok()?;
    if !matches!(absolute.scheme(), "http" | "https") {
        return None;
    }
    HeaderValue::try_from(format!("/{absolute}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, TRANSFER_ENCODING};

    #[test]
    fn relayed_headers_keep_content_and_force_cors() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "image/png".parse().unwrap());
        headers.insert(TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, "https://origin.test".parse().unwrap());

        relay_headers(&mut headers);

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "image/png");
        assert!(headers.get(TRANSFER_ENCODING).is_none());
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    fn base() -> Url {
        Url::parse("https://upstream.test/a/b?x=1").unwrap()
    }

    #[test]
    fn relative_location_resolves_against_responding_url() {
        let location = relay_location(&base(), &HeaderValue::from_static("/final")).unwrap();
        assert_eq!(location, "/https://upstream.test/final");

        let location = relay_location(&base(), &HeaderValue::from_static("c?y=2")).unwrap();
        assert_eq!(location, "/https://upstream.test/a/c?y=2");
    }

    #[test]
    fn absolute_location_is_wrapped() {
        let location =
            relay_location(&base(), &HeaderValue::from_static("http://other.test/x")).unwrap();
        assert_eq!(location, "/http://other.test/x");

        let location =
            relay_location(&base(), &HeaderValue::from_static("//cdn.test/img.png")).unwrap();
        assert_eq!(location, "/https://cdn.test/img.png");
    }

    #[test]
    fn non_http_location_is_left_alone() {
        assert!(relay_location(&base(), &HeaderValue::from_static("mailto:a@b.test")).is_none());
    }
}
