//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser and the [`Commands`] enum for
//! subcommands (run, policy). Listen and logging flags have environment
//! variable equivalents for container deployments. The header policy
//! itself is compiled in and has no flags.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "urlrelay",
    version,
    about = "HTTP forwarding relay for path-embedded target URLs",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        urlrelay run                                 Listen on 0.0.0.0:3000\n  \
        curl http://localhost:3000/https://example.com/\n  \
        urlrelay policy                              Show the header policy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Run(RunArgs),

    /// Show the compiled-in header policy
    Policy(PolicyArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        urlrelay run                      Listen on 0.0.0.0:3000\n  \
        urlrelay run -p 8080 --pretty     Local dev mode\n  \
        urlrelay run --json -l debug      Verbose structured logs")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct PolicyArgs {
    /// Show only the rules applied to this target hostname
    #[arg(long)]
    pub host: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: PolicyFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum PolicyFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["urlrelay", "run"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, 3000);
        assert_eq!(args.host, "0.0.0.0");
        assert!(!args.pretty);
    }

    #[test]
    fn pretty_and_json_conflict() {
        assert!(Cli::try_parse_from(["urlrelay", "run", "--pretty", "--json"]).is_err());
    }

    #[test]
    fn policy_host_filter() {
        let cli =
            Cli::try_parse_from(["urlrelay", "policy", "--host", "i.pximg.net", "--format", "json"])
                .unwrap();
        let Some(Commands::Policy(args)) = cli.command else {
            panic!("expected policy");
        };
        assert_eq!(args.host.as_deref(), Some("i.pximg.net"));
        assert!(matches!(args.format, PolicyFormat::Json));
    }
}
