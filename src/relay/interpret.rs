//! Turning an inbound request into either a usage hint or an outbound request.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::HOST;
use axum::http::{HeaderMap, Method, Uri};
use url::Url;

use super::headers;
use super::target;
use crate::error::RelayError;

/// Sample target shown in the usage hint.
pub const USAGE_EXAMPLE_TARGET: &str = "https://github.com";

#[derive(Debug)]
pub struct OutboundRequest {
    pub target: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Body,
}

impl OutboundRequest {
    /// Convert into a request the HTTP client can send.
    pub fn into_http(self) -> Result<axum::http::Request<Body>, RelayError> {
        // Fragments never go on the wire.
        let mut wire = self.target;
        wire.set_fragment(None);
        let uri: Uri = wire
            .as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| RelayError::InvalidTargetUrl {
                input: wire.to_string(),
                source: Box::new(e),
            })?;

        let mut request = axum::http::Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

#[derive(Debug)]
pub enum Interpreted {
    Usage(String),
    Forward(OutboundRequest),
}

#[must_use]
pub fn usage_message(host: &str) -> String {
    format!(
        "Append the target URL after the slash, e.g. https://{host}/{USAGE_EXAMPLE_TARGET}\n"
    )
}

fn inbound_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> &'a str {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(axum::http::uri::Authority::as_str))
        .unwrap_or("localhost")
}

/// Interpret an inbound request.
///
/// The root path yields a usage hint. Any other path must embed an
/// absolute `http`/`https` URL; method, headers and body are carried over
/// as-is apart from connection-level headers and `Host`.
pub fn interpret(request: Request) -> Result<Interpreted, RelayError> {
    let (parts, body) = request.into_parts();

    if target::is_usage_path(parts.uri.path()) {
        let host = inbound_host(&parts.headers, &parts.uri);
        return Ok(Interpreted::Usage(usage_message(host)));
    }

    // Fragments are never part of an HTTP request target.
    let target = target::reconstruct_target(parts.uri.path(), parts.uri.query(), None)?;

    let mut headers = parts.headers;
    headers::strip_hop_by_hop(&mut headers);
    headers::clear_host(&mut headers);

    Ok(Interpreted::Forward(OutboundRequest {
        target,
        method: parts.method,
        headers,
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str, host: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(host) = host {
            builder = builder.header(HOST, host);
        }
        builder.body(Body::from("payload")).unwrap()
    }

    #[test]
    fn root_returns_usage_with_host() {
        let result = interpret(request(Method::GET, "/", Some("proxy.test"))).unwrap();
        let Interpreted::Usage(message) = result else {
            panic!("expected usage");
        };
        assert!(message.contains("proxy.test"));
        assert!(message.contains("https://proxy.test/https://github.com"));
    }

    #[test]
    fn root_usage_ignores_method() {
        let result = interpret(request(Method::POST, "/", Some("proxy.test"))).unwrap();
        assert!(matches!(result, Interpreted::Usage(_)));
    }

    #[test]
    fn root_usage_falls_back_without_host_header() {
        let result = interpret(request(Method::GET, "/", None)).unwrap();
        let Interpreted::Usage(message) = result else {
            panic!("expected usage");
        };
        assert!(message.contains("https://localhost/https://github.com"));
    }

    #[test]
    fn builds_outbound_request() {
        let mut inbound = request(
            Method::PUT,
            "/https://example.com/a?x=1",
            Some("proxy.test"),
        );
        inbound
            .headers_mut()
            .insert("x-custom", "kept".parse().unwrap());
        inbound
            .headers_mut()
            .insert("connection", "close".parse().unwrap());

        let Interpreted::Forward(outbound) = interpret(inbound).unwrap() else {
            panic!("expected forward");
        };
        assert_eq!(outbound.target.as_str(), "https://example.com/a?x=1");
        assert_eq!(outbound.method, Method::PUT);
        assert!(outbound.headers.get(HOST).is_none());
        assert_eq!(outbound.headers.get("x-custom").unwrap(), "kept");
        assert!(outbound.headers.get("connection").is_none());
    }

    #[test]
    fn malformed_target_is_an_error() {
        let err = interpret(request(Method::GET, "/not-a-url", Some("proxy.test"))).unwrap_err();
        assert!(matches!(err, RelayError::InvalidTargetUrl { .. }));
    }

    #[test]
    fn into_http_drops_fragment() {
        let outbound = OutboundRequest {
            target: Url::parse("https://example.com/a?x=1#f").unwrap(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: Body::empty(),
        };
        let request = outbound.into_http().unwrap();
        assert_eq!(request.uri(), "https://example.com/a?x=1");
    }
}
