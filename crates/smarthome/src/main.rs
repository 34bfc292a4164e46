mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use smarthome_api::{SmartHome, TransportConfig};
use smarthome_config::{FileStore, KeyValueStore, ServerSettings};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let config = smarthome_config::load_config_or_default();
    cli.global.apply_defaults(&config.defaults);

    let state_path = cli
        .global
        .state_file
        .clone()
        .unwrap_or_else(|| config.state_path());

    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "smarthome", &mut std::io::stdout());
            Ok(())
        }

        // Config commands only touch the local state file
        Command::Config(args) => {
            let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(state_path.clone())?);
            commands::config_cmd::handle(
                args,
                &cli.global,
                &ServerSettings::new(store),
                &config,
                &state_path,
            )
        }

        // Everything else goes through the dispatcher
        cmd => {
            let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(state_path)?);
            let timeout = cli
                .global
                .timeout
                .map_or(smarthome_api::transport::DEFAULT_TIMEOUT, Duration::from_secs);
            let home = SmartHome::open(store, TransportConfig::default().with_timeout(timeout))?;

            tracing::debug!(
                command = ?cmd,
                server_url = %home.dispatcher().server_url(),
                "dispatching command"
            );
            commands::dispatch(cmd, &home, &cli.global).await
        }
    }
}
