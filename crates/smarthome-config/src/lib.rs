//! Shared configuration for the smart-home client.
//!
//! Three concerns live here:
//!
//! - **[`KeyValueStore`]**: durable string storage ([`MemoryStore`],
//!   [`FileStore`]) holding the server URL, the demo flag and the session.
//! - **[`ServerSettings`]**: typed accessor over that store, including
//!   server URL normalization.
//! - **[`Config`]**: front-end preferences (output format, timeout, state
//!   file location) loaded from `config.toml` and `SMARTHOME_*` env vars.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod settings;
pub mod store;

pub use settings::{
    DEFAULT_SERVER_URL, DEMO_MODE_KEY, SERVER_URL_KEY, ServerSettings, TOKEN_KEY, USER_KEY,
    normalize_server_url, validate_server_url,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to parse state file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Front-end preferences. The persisted server settings are not part of
/// this file; they live in the state store at [`Config::state_file`].
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Override for the state file location.
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// HTTP timeout in seconds for live requests.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "smarthome", "smarthome")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("smarthome");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted key-value state.
pub fn default_state_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("state.toml"),
        |dirs| dirs.data_dir().join("state.toml"),
    )
}

impl Config {
    /// Effective state file: explicit override or the platform default.
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load config from the canonical path, layered with `SMARTHOME_*` env vars.
///
/// Nested keys use a double underscore: `SMARTHOME_DEFAULTS__TIMEOUT=5`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file, layered with `SMARTHOME_*` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SMARTHOME_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}
