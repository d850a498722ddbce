//! urlrelay is an HTTP forwarding relay for path-embedded target URLs.
//!
//! A request for `/https://example.com/a?x=1` is forwarded to
//! `https://example.com/a?x=1` with the same method, headers and body.
//! Before dispatch, `Origin` and `Referer` are rewritten according to a
//! compiled-in per-hostname policy. The response is streamed back with
//! `Access-Control-Allow-Origin: *`.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, policy).
//! - [`error`] -- Unified error type using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`relay`] -- Core forwarding: target extraction, header policy, and
//!   dispatch with redirect following.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod error;
pub mod logging;
pub mod relay;
pub mod server;
