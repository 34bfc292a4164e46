//! Command dispatch: routes parsed CLI commands to their handlers.

pub mod config_cmd;
pub mod devices;
pub mod locations;
pub mod notifications;
pub mod scenarios;
pub mod session;
pub mod stats;
pub mod util;

use smarthome_api::SmartHome;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that talks to the backend (or the demo data).
pub async fn dispatch(
    cmd: Command,
    home: &SmartHome,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(home, args, global).await,
        Command::Scenarios(args) => scenarios::handle(home, args, global).await,
        Command::Notifications(args) => notifications::handle(home, args, global).await,
        Command::Stats(args) => stats::handle(home, args, global).await,
        Command::Locations(args) => locations::handle(home, args, global).await,
        Command::Users(args) => session::users(home, args, global).await,
        Command::Login(args) => session::login(home, args, global).await,
        Command::Logout => session::logout(home, global),
        Command::Whoami => session::whoami(home, global).await,
        Command::Status => session::status(home, global).await,

        // Handled before a client is built
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "runs without a backend connection and cannot be dispatched".into(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use clap::Parser;
    use smarthome_api::TransportConfig;
    use smarthome_config::MemoryStore;

    use super::*;
    use crate::cli::Cli;

    #[tokio::test]
    async fn local_commands_are_not_dispatched() {
        let home =
            SmartHome::open(Arc::new(MemoryStore::new()), TransportConfig::default()).unwrap();

        for args in [
            ["smarthome", "completions", "bash"],
            ["smarthome", "config", "path"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            let err = dispatch(cli.command, &home, &cli.global).await.unwrap_err();
            assert!(matches!(err, CliError::Validation { .. }), "got: {err:?}");
        }
    }
}
