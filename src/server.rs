//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the HTTP client
//! and the header policy), [`build_router`] for constructing the Axum
//! router, [`build_http_client`] for the connection-pooled,
//! redirect-following client, and [`shutdown_signal`] for SIGTERM /
//! Ctrl+C handling.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::follow_redirect::{FollowRedirect, FollowRedirectLayer};
use tower_http::trace::TraceLayer;

use crate::relay;
use crate::relay::policy::{PolicyTable, BUILTIN};

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, Body>;
pub type RelayClient = FollowRedirect<HttpClient>;

pub struct AppState {
    pub http_client: RelayClient,
    pub policy: Arc<PolicyTable>,
}

impl AppState {
    /// State backed by the compiled-in header policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(Arc::clone(&BUILTIN))
    }

    #[must_use]
    pub fn with_policy(policy: Arc<PolicyTable>) -> Self {
        Self {
            http_client: build_http_client(),
            policy,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn build_http_client() -> RelayClient {
    // Several rustls crypto providers may be compiled in; pin `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    let client = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https);

    ServiceBuilder::new()
        .layer(FollowRedirectLayer::new())
        .service(client)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(relay::relay_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
