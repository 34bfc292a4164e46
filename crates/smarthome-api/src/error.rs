use thiserror::Error;

/// Top-level error type for the `smarthome-api` crate.
///
/// Covers local validation, domain-translated statuses, transport failures
/// and storage problems. Demo-mode soft failures (`success: false` payloads)
/// are *not* errors; they resolve normally.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local validation ────────────────────────────────────────────
    /// Rejected before any request was issued.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    // ── Domain-translated statuses ──────────────────────────────────
    /// Device creation answered with HTTP 409.
    #[error("A device named '{name}' already exists")]
    DeviceExists { name: String },

    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401. The session has already been torn down when this surfaces.
    #[error("Unauthorized -- session cleared, login required")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(#[from] smarthome_config::ConfigError),
}

impl Error {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::DeviceExists { .. } => Some(409),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` for timeouts and connection failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(Error::Unauthorized.status(), Some(401));
        assert_eq!(
            Error::DeviceExists { name: "Lamp".into() }.status(),
            Some(409)
        );
        assert!(
            Error::Status {
                status: 404,
                message: "missing".into()
            }
            .is_not_found()
        );
        assert_eq!(
            Error::Validation {
                field: "name",
                reason: "empty".into()
            }
            .status(),
            None
        );
    }

    #[test]
    fn device_exists_message_mentions_conflict() {
        let msg = Error::DeviceExists {
            name: "Hall Lamp".into(),
        }
        .to_string();
        assert!(msg.contains("already exists"), "{msg}");
        assert!(msg.contains("Hall Lamp"), "{msg}");
    }
}
