// Live HTTP data source
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token attachment
// and response unwrapping. The token is read from storage on every
// request, so logging in or out never requires a rebuild.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use smarthome_config::KeyValueStore;
use tracing::debug;
use url::Url;

use super::{DataSource, SourceKind};
use crate::error::Error;
use crate::request::ApiRequest;
use crate::session;
use crate::transport::TransportConfig;

/// Timeout of the connection probe, shorter than regular requests.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client bound to one server base URL.
pub struct LiveDataSource {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LiveDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDataSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LiveDataSource {
    /// Build a client for `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(
        base_url: &str,
        store: Arc<dyn KeyValueStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        // Validate eagerly so a bad URL fails at configuration time.
        Url::parse(base_url)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append a request path to the base URL, keeping the base path
    /// (`/api`) intact.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    /// Attach `Authorization: Bearer <token>` when a session exists.
    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match session::token(self.store.as_ref()) {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// `GET {base}/health` with [`HEALTH_TIMEOUT`]; any 2xx counts as up.
    pub async fn health(&self) -> Result<(), Error> {
        let url = self.url("health")?;
        debug!("GET {url} (health probe)");

        let resp = self
            .http
            .get(url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
            })
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl DataSource for LiveDataSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Value, Error> {
        let url = self.url(&request.path)?;
        debug!(method = %request.method, "{url}");

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = self.apply_auth(builder).send().await?;
        self.handle_response(resp).await
    }
}
