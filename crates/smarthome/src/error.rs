//! CLI error types with miette diagnostics.
//!
//! Maps `smarthome_api::Error` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use smarthome_api::Error as ApiError;
use smarthome_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the server at {url}")]
    #[diagnostic(
        code(smarthome::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Change it with: smarthome config set-server <url>\n\
             Or work offline with: smarthome config demo on"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(smarthome::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login required")]
    #[diagnostic(
        code(smarthome::login_required),
        help("The server rejected the stored session. Run: smarthome login <email>")
    )]
    LoginRequired,

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(smarthome::not_found),
        help("List the available ids with the matching `list` subcommand.")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(smarthome::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(smarthome::api_error))]
    Api { status: u16, message: String },

    /// The backend (or demo data) answered `success: false`.
    #[error("Request rejected: {message}")]
    #[diagnostic(code(smarthome::rejected))]
    Rejected { message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(
        code(smarthome::invalid_response),
        help("Run with -vv to see the raw response.")
    )]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smarthome::validation))]
    Validation { field: String, reason: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(smarthome::state),
        help("Check permissions of the state file (see: smarthome config path).")
    )]
    State(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(smarthome::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(smarthome::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::LoginRequired => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } | Self::Json(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::State(other),
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { field, reason } => CliError::Validation {
                field: field.into(),
                reason,
            },

            ApiError::DeviceExists { name } => CliError::Conflict {
                message: format!("A device named '{name}' already exists"),
            },

            ApiError::Unauthorized => CliError::LoginRequired,

            ApiError::Status { status: 404, message } => CliError::NotFound { message },
            ApiError::Status { status, message } => CliError::Api { status, message },

            ApiError::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string);
                if e.is_timeout() {
                    CliError::Timeout { url }
                } else {
                    CliError::ConnectionFailed {
                        url,
                        source: Box::new(e),
                    }
                }
            }

            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "server url".into(),
                reason: e.to_string(),
            },

            ApiError::Deserialization { message, .. } => CliError::InvalidResponse { message },

            ApiError::Storage(e) => e.into(),
        }
    }
}
