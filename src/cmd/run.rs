//! `urlrelay run` — start the relay server.
//!
//! Initialises logging, binds the listener, and serves until Ctrl+C or
//! SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let state = Arc::new(AppState::new());
    let policy_hosts = state.policy.entries().len();
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, policy_entries = policy_hosts, "urlrelay started");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("urlrelay stopped");
    Ok(())
}
