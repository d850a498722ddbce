//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production) or pretty-printed output (for TTY / local dev). Format
//! is auto-detected from the terminal but can be forced via `--json`
//! or `--pretty`. The chosen level applies to this crate and to the HTTP
//! trace layer; connection-level chatter from the client stack is capped
//! at `warn`.

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "hyper_rustls", "rustls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[must_use]
pub fn filter(level: &LogLevel) -> Targets {
    let level = level.to_tracing_level();
    NOISY_TARGETS
        .iter()
        .fold(Targets::new().with_default(level), |targets, target| {
            targets.with_target(*target, level.min(Level::WARN))
        })
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let filter = filter(level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_wins() {
        assert_eq!(resolve_format(false, true), LogFormat::Json);
    }

    #[test]
    fn pretty_flag_forces_pretty() {
        assert_eq!(resolve_format(true, false), LogFormat::Pretty);
    }

    #[test]
    fn client_stack_is_capped_at_warn() {
        let targets = filter(&LogLevel::Trace);
        assert!(targets.would_enable("urlrelay", &Level::TRACE));
        assert!(!targets.would_enable("hyper_util", &Level::DEBUG));
        assert!(targets.would_enable("hyper_util", &Level::WARN));
    }

    #[test]
    fn quiet_level_is_not_raised_for_client_stack() {
        let targets = filter(&LogLevel::Error);
        assert!(!targets.would_enable("rustls", &Level::WARN));
    }
}
