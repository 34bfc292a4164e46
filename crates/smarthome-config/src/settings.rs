// ── Server settings accessor ──
//
// Reads and writes the two persisted client settings: the backend base URL
// and the demo-mode flag. Values always round-trip through the store so a
// change made by one component is visible to every other reader.

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::ConfigError;
use crate::store::KeyValueStore;

/// Storage key for the backend base URL.
pub const SERVER_URL_KEY: &str = "smart_home_server_url";
/// Storage key for the demo-mode flag (`"true"` enables it).
pub const DEMO_MODE_KEY: &str = "smart_home_demo_mode";
/// Storage key for the bearer token of the current session.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the JSON-encoded user of the current session.
pub const USER_KEY: &str = "user";

/// Base URL used when nothing (or an empty value) has been configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000/api";

const API_SUFFIX: &str = "api";

/// Normalize a user-supplied server address.
///
/// - empty input falls back to [`DEFAULT_SERVER_URL`]
/// - a missing `http://` / `https://` scheme becomes `http://`
/// - the path must end in `/api` (a trailing slash after it is kept)
pub fn normalize_server_url(candidate: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return DEFAULT_SERVER_URL.to_owned();
    }

    let mut url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };

    if !url.ends_with("/api") && !url.ends_with("/api/") {
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(API_SUFFIX);
    }

    url
}

/// Reject a normalized server URL that cannot be parsed.
pub fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    Url::parse(url)
        .map(drop)
        .map_err(|e| ConfigError::Validation {
            field: "server URL".into(),
            reason: format!("'{url}' is not a valid URL ({e})"),
        })
}

/// Typed view over the persisted server settings.
#[derive(Clone)]
pub struct ServerSettings {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSettings")
            .field("server_url", &self.server_url())
            .field("demo_mode", &self.demo_mode())
            .finish()
    }
}

impl ServerSettings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying store (shared with session handling).
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Persisted base URL, or the default when unset or empty.
    pub fn server_url(&self) -> String {
        self.store
            .get(SERVER_URL_KEY)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned())
    }

    /// Whether demo mode is on. Only the exact string `"true"` enables it.
    pub fn demo_mode(&self) -> bool {
        self.store.get(DEMO_MODE_KEY).as_deref() == Some("true")
    }

    /// Normalize, persist and return the new base URL. An unparseable URL
    /// is rejected and the stored value is left untouched.
    pub fn set_server_url(&self, candidate: &str) -> Result<String, ConfigError> {
        let url = normalize_server_url(candidate);
        validate_server_url(&url)?;
        self.store.set(SERVER_URL_KEY, &url)?;
        info!(server_url = %url, "server URL updated");
        Ok(url)
    }

    pub fn set_demo_mode(&self, enabled: bool) -> Result<(), ConfigError> {
        self.store
            .set(DEMO_MODE_KEY, if enabled { "true" } else { "false" })?;
        info!(enabled, "demo mode updated");
        Ok(())
    }

    /// Restore the default URL and switch demo mode off.
    pub fn reset(&self) -> Result<(), ConfigError> {
        self.set_server_url(DEFAULT_SERVER_URL)?;
        self.set_demo_mode(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    fn settings() -> ServerSettings {
        ServerSettings::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn normalize_adds_scheme_and_suffix() {
        assert_eq!(normalize_server_url("example.com"), "http://example.com/api");
        assert_eq!(
            normalize_server_url("example.com/"),
            "http://example.com/api"
        );
        assert_eq!(
            normalize_server_url("https://hub.local:8080"),
            "https://hub.local:8080/api"
        );
    }

    #[test]
    fn normalize_keeps_complete_urls() {
        assert_eq!(normalize_server_url("https://x.com/api/"), "https://x.com/api/");
        assert_eq!(normalize_server_url("http://10.0.0.2/api"), "http://10.0.0.2/api");
    }

    #[test]
    fn normalize_empty_falls_back_to_default() {
        assert_eq!(normalize_server_url(""), DEFAULT_SERVER_URL);
        assert_eq!(normalize_server_url("   "), DEFAULT_SERVER_URL);
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings();
        assert_eq!(s.server_url(), DEFAULT_SERVER_URL);
        assert!(!s.demo_mode());
    }

    #[test]
    fn set_server_url_persists_normalized_value() {
        let s = settings();
        let url = s.set_server_url("example.com").unwrap();
        assert_eq!(url, "http://example.com/api");
        assert_eq!(s.server_url(), "http://example.com/api");
        assert_eq!(
            s.store().get(SERVER_URL_KEY).as_deref(),
            Some("http://example.com/api")
        );
    }

    #[test]
    fn set_server_url_rejects_unparseable_input() {
        let s = settings();
        s.set_server_url("hub.local:8080").unwrap();

        let err = s.set_server_url("my hub.local").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "server URL"),
            "got: {err:?}"
        );
        assert_eq!(s.server_url(), "http://hub.local:8080/api");
    }

    #[test]
    fn validate_accepts_normalized_defaults() {
        assert!(validate_server_url(DEFAULT_SERVER_URL).is_ok());
        assert!(validate_server_url(&normalize_server_url("10.0.0.2:3000")).is_ok());
        assert!(validate_server_url("http://my hub.local/api").is_err());
    }

    #[test]
    fn demo_flag_is_string_encoded() {
        let s = settings();
        s.set_demo_mode(true).unwrap();
        assert_eq!(s.store().get(DEMO_MODE_KEY).as_deref(), Some("true"));
        assert!(s.demo_mode());

        s.set_demo_mode(false).unwrap();
        assert_eq!(s.store().get(DEMO_MODE_KEY).as_deref(), Some("false"));
        assert!(!s.demo_mode());
    }

    #[test]
    fn only_exact_true_enables_demo() {
        let s = settings();
        s.store().set(DEMO_MODE_KEY, "TRUE").unwrap();
        assert!(!s.demo_mode());
        s.store().set(DEMO_MODE_KEY, "1").unwrap();
        assert!(!s.demo_mode());
    }

    #[test]
    fn reset_restores_defaults() {
        let s = settings();
        s.set_server_url("https://remote.example/api").unwrap();
        s.set_demo_mode(true).unwrap();

        s.reset().unwrap();

        assert_eq!(s.server_url(), DEFAULT_SERVER_URL);
        assert!(!s.demo_mode());
    }
}
