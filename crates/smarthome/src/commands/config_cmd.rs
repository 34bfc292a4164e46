//! Config subcommand handlers.
//!
//! These touch only the local state file and never contact the server.

use std::path::Path;

use serde::Serialize;
use smarthome_config::{Config, ServerSettings};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, Toggle};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ConfigView<'a> {
    server_url: String,
    demo_mode: bool,
    logged_in: bool,
    state_file: String,
    output: &'a str,
    color: &'a str,
    timeout: u64,
}

fn config_detail(v: &ConfigView<'_>) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "server_url = \"{}\"", v.server_url);
    let _ = writeln!(out, "demo_mode = {}", v.demo_mode);
    let _ = writeln!(out, "token = \"{}\"", if v.logged_in { "****" } else { "" });
    let _ = writeln!(out, "state_file = \"{}\"", v.state_file);
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", v.output);
    let _ = writeln!(out, "color = \"{}\"", v.color);
    let _ = write!(out, "timeout = {}", v.timeout);

    out
}

pub fn handle(
    args: ConfigArgs,
    global: &GlobalOpts,
    settings: &ServerSettings,
    config: &Config,
    state_path: &Path,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let view = ConfigView {
                server_url: settings.server_url(),
                demo_mode: settings.demo_mode(),
                logged_in: smarthome_api::session::token(settings.store().as_ref()).is_some(),
                state_file: state_path.display().to_string(),
                output: &config.defaults.output,
                color: &config.defaults.color,
                timeout: config.defaults.timeout,
            };
            let out = output::render_single(&global.format(), &view, config_detail, |v| {
                v.server_url.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetServer { url } => {
            if url.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "url".into(),
                    reason: "server URL cannot be empty".into(),
                });
            }
            let stored = settings.set_server_url(&url)?;
            if !global.quiet {
                eprintln!("Server URL set to {stored}");
            }
            Ok(())
        }

        ConfigCommand::Demo { state } => {
            let enabled = matches!(state, Toggle::On);
            settings.set_demo_mode(enabled)?;
            if !global.quiet {
                let label = if enabled { "enabled" } else { "disabled" };
                eprintln!("Demo mode {label}");
            }
            Ok(())
        }

        ConfigCommand::Reset => {
            settings.reset()?;
            if !global.quiet {
                eprintln!("Server settings restored to defaults");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &format!(
                    "config: {}\nstate:  {}",
                    smarthome_config::config_path().display(),
                    state_path.display()
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
