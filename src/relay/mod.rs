//! Core relay handler.
//!
//! [`relay_handler`] is the Axum fallback that receives every request.
//! It interprets the path ([`interpret`], [`target`]), rewrites headers
//! for the target host ([`policy`]), and dispatches to the target
//! ([`forward`]). Failures become explicit error responses: `400` for a
//! path that does not embed a usable URL, `502` when the target cannot be
//! reached.

pub mod forward;
pub mod headers;
pub mod interpret;
pub mod policy;
pub mod target;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};

use crate::error::RelayError;
use crate::server::AppState;
use interpret::Interpreted;

pub async fn relay_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "request received"
    );

    match relay(&state, request, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, RelayError::Dispatch { .. }) {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %e,
                    "upstream dispatch failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %e,
                    "rejected request"
                );
            }
            e.into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    request: Request,
    request_id: &str,
) -> Result<Response, RelayError> {
    let mut outbound = match interpret::interpret(request)? {
        Interpreted::Usage(message) => return Ok(message.into_response()),
        Interpreted::Forward(outbound) => outbound,
    };

    tracing::debug!(
        request_id = %request_id,
        target = %outbound.target,
        "target resolved"
    );

    state.policy.apply(&mut outbound);
    forward::forward(&state.http_client, outbound, request_id).await
}
