//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`policy`].

pub mod policy;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::RelayError;

pub async fn dispatch(cli: Cli) -> Result<(), RelayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Policy(ref args)) => {
            policy::execute(args);
            Ok(())
        }
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  urlrelay v{version} \u{2014} HTTP forwarding relay\n\n  \
         No command provided. To get started:\n\n    \
         urlrelay run                      Start the relay on 0.0.0.0:3000\n    \
         urlrelay run -p 8080              Start on another port\n    \
         urlrelay policy                   Show the header rewrite rules\n    \
         urlrelay --help                   See all commands and options\n"
    );
}
