//! Unified error type for urlrelay.
//!
//! [`RelayError`] covers both per-request failures (a path that does not
//! embed a usable target, an upstream that cannot be reached) and
//! process-level failures (bad listen address, bind errors). Request
//! failures map to a fixed status code via [`RelayError::status`] and
//! render as a short plain-text body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::relay::headers::allow_any_origin;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("'{input}' is not a valid absolute URL: {source}")]
    InvalidTargetUrl {
        input: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unsupported scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("upstream request to {target} failed: {source}")]
    Dispatch {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidTargetUrl { .. } | Self::UnsupportedScheme { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Dispatch { .. } => StatusCode::BAD_GATEWAY,
            Self::AddressParse(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.to_string()).into_response();
        allow_any_origin(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_errors_are_client_errors() {
        let err = RelayError::UnsupportedScheme {
            scheme: "ftp".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = RelayError::InvalidTargetUrl {
            input: "not-a-url".into(),
            source: Box::new(url::ParseError::RelativeUrlWithoutBase),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("not-a-url"));
    }

    #[test]
    fn dispatch_error_is_bad_gateway() {
        let err = RelayError::Dispatch {
            target: "https://example.invalid/".into(),
            source: "connection refused".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn error_response_allows_any_origin() {
        let response = RelayError::UnsupportedScheme {
            scheme: "mailto".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
