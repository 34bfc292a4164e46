// ── Request dispatcher ──
//
// Single entry point for every data access. Reads the demo flag at call
// time and routes the request to exactly one data source. Owns the
// session signal that fires when the backend rejects the credentials.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smarthome_config::{KeyValueStore, ServerSettings};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::demo::DemoDataSource;
use crate::error::Error;
use crate::models::ConnectionStatus;
use crate::request::ApiRequest;
use crate::session::{self, SessionState};
use crate::source::{DataSource, LiveDataSource};
use crate::transport::TransportConfig;

/// Routes requests to the live backend or the demo repository.
///
/// Cheaply cloneable via `Arc<DispatcherInner>`; clones share the live
/// client, the demo state and the session signal.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    settings: ServerSettings,
    transport: TransportConfig,
    /// `None` while the stored server URL does not parse.
    live: ArcSwapOption<LiveDataSource>,
    demo: Arc<DemoDataSource>,
    session: watch::Sender<SessionState>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("server_url", &self.server_url())
            .field("demo_mode", &self.inner.settings.demo_mode())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build a dispatcher over `store`, with a live client for the stored
    /// server URL and a fresh demo repository.
    ///
    /// An unparseable stored URL does not fail construction: demo requests
    /// keep working and live requests report the URL error.
    pub fn new(store: Arc<dyn KeyValueStore>, transport: TransportConfig) -> Result<Self, Error> {
        Self::with_demo_source(store, transport, DemoDataSource::new())
    }

    /// Like [`new`](Self::new) with a caller-provided demo source (seeded
    /// repository, custom latency).
    pub fn with_demo_source(
        store: Arc<dyn KeyValueStore>,
        transport: TransportConfig,
        demo: DemoDataSource,
    ) -> Result<Self, Error> {
        let settings = ServerSettings::new(Arc::clone(&store));
        let live = build_live(&settings, &transport)?;
        let (session, _) = watch::channel(SessionState::from_store(store.as_ref()));

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                settings,
                transport,
                live: ArcSwapOption::new(live),
                demo: Arc::new(demo),
                session,
            }),
        })
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.inner.settings
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        self.inner.settings.store()
    }

    /// Demo source, for inspecting demo state.
    pub fn demo(&self) -> &DemoDataSource {
        &self.inner.demo
    }

    /// Base URL the live client currently talks to, or the stored value
    /// when it could not be turned into a client.
    pub fn server_url(&self) -> String {
        self.inner.live.load_full().map_or_else(
            || self.inner.settings.server_url(),
            |live| live.base_url().to_owned(),
        )
    }

    /// Subscribe to session changes. A `LoginRequired` value means the
    /// backend rejected the stored token and the user has to log in again.
    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    pub fn session_state(&self) -> SessionState {
        *self.inner.session.borrow()
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Serve `request` from the data source selected by the demo flag.
    pub async fn request(&self, request: ApiRequest) -> Result<Value, Error> {
        let source: Arc<dyn DataSource> = if self.inner.settings.demo_mode() {
            self.inner.demo.clone()
        } else {
            self.live_source()?
        };
        let kind = source.kind();
        debug!(source = %kind, method = %request.method, path = %request.path, "dispatching");

        match source.execute(&request).await {
            Err(Error::Unauthorized) => {
                warn!(path = %request.path, "backend answered 401, clearing session");
                self.expire_session();
                Err(Error::Unauthorized)
            }
            Err(e) if e.is_transient() => {
                warn!(source = %kind, path = %request.path, error = %e, "backend unreachable");
                Err(e)
            }
            other => other,
        }
    }

    /// Current live client, rebuilt on demand so an invalid stored URL
    /// surfaces as [`Error::InvalidUrl`].
    fn live_source(&self) -> Result<Arc<LiveDataSource>, Error> {
        match self.inner.live.load_full() {
            Some(live) => Ok(live),
            None => LiveDataSource::new(
                &self.inner.settings.server_url(),
                Arc::clone(self.inner.settings.store()),
                &self.inner.transport,
            )
            .map(Arc::new),
        }
    }

    /// [`request`](Self::request) decoded into `T`.
    pub async fn request_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, Error> {
        let value = self.request(request).await?;
        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: value.to_string(),
        })
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Rebuild the live client from the stored server URL.
    ///
    /// Fails with [`Error::InvalidUrl`] when the stored URL does not parse;
    /// the previous client is dropped either way.
    pub fn update_client(&self) -> Result<(), Error> {
        let url = self.inner.settings.server_url();
        let result = LiveDataSource::new(
            &url,
            Arc::clone(self.inner.settings.store()),
            &self.inner.transport,
        );
        match result {
            Ok(live) => {
                self.inner.live.store(Some(Arc::new(live)));
                debug!(%url, "live client rebuilt");
                Ok(())
            }
            Err(e) => {
                self.inner.live.store(None);
                Err(e)
            }
        }
    }

    /// Persist a new server URL (normalized) and switch the live client to it.
    /// An unparseable URL is rejected before anything is stored.
    pub fn set_server_url(&self, candidate: &str) -> Result<String, Error> {
        let url = self.inner.settings.set_server_url(candidate)?;
        self.update_client()?;
        Ok(url)
    }

    /// Persist the demo flag. Never fails on the stored server URL.
    pub fn set_demo_mode(&self, enabled: bool) -> Result<(), Error> {
        self.inner.settings.set_demo_mode(enabled)?;
        self.refresh_live()
    }

    /// Restore the default server URL and leave demo mode.
    pub fn reset_settings(&self) -> Result<(), Error> {
        self.inner.settings.reset()?;
        self.refresh_live()
    }

    fn refresh_live(&self) -> Result<(), Error> {
        let live = build_live(&self.inner.settings, &self.inner.transport)?;
        self.inner.live.store(live);
        Ok(())
    }

    /// Probe the backend. Demo mode always reports connected; live mode
    /// asks `{server}/health`. Failures are reported, not returned.
    pub async fn test_connection(&self) -> ConnectionStatus {
        if self.inner.settings.demo_mode() {
            return ConnectionStatus::connected();
        }

        let live = match self.live_source() {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "live client unavailable");
                return ConnectionStatus::failed(e.to_string());
            }
        };
        match live.health().await {
            Ok(()) => {
                info!(url = live.base_url(), "backend reachable");
                ConnectionStatus::connected()
            }
            Err(e) => {
                warn!(url = live.base_url(), error = %e, "backend unreachable");
                ConnectionStatus::failed(e.to_string())
            }
        }
    }

    // ── Session ──────────────────────────────────────────────────────

    pub(crate) fn begin_session(&self, token: &str, user: &Value) -> Result<(), Error> {
        session::persist(self.store().as_ref(), token, user)?;
        self.inner.session.send_replace(SessionState::Authenticated);
        Ok(())
    }

    pub(crate) fn end_session(&self) -> Result<(), Error> {
        session::clear(self.store().as_ref())?;
        self.inner.session.send_replace(SessionState::Anonymous);
        Ok(())
    }

    fn expire_session(&self) {
        if let Err(e) = session::clear(self.store().as_ref()) {
            warn!(error = %e, "failed to clear stored credentials");
        }
        self.inner.session.send_replace(SessionState::LoginRequired);
    }
}

/// Live client for the stored URL, `None` when that URL does not parse.
fn build_live(
    settings: &ServerSettings,
    transport: &TransportConfig,
) -> Result<Option<Arc<LiveDataSource>>, Error> {
    let url = settings.server_url();
    match LiveDataSource::new(&url, Arc::clone(settings.store()), transport) {
        Ok(live) => Ok(Some(Arc::new(live))),
        Err(Error::InvalidUrl(e)) => {
            warn!(%url, error = %e, "stored server URL is invalid, live requests disabled");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use smarthome_config::{DEFAULT_SERVER_URL, MemoryStore, SERVER_URL_KEY};

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MemoryStore::new()), TransportConfig::default()).unwrap()
    }

    #[test]
    fn starts_on_default_url() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.server_url(), DEFAULT_SERVER_URL);
        assert_eq!(dispatcher.session_state(), SessionState::Anonymous);
    }

    #[test]
    fn set_server_url_rebuilds_client() {
        let dispatcher = dispatcher();
        let url = dispatcher.set_server_url("hub.local:8080").unwrap();
        assert_eq!(url, "http://hub.local:8080/api");
        assert_eq!(dispatcher.server_url(), "http://hub.local:8080/api");

        dispatcher.reset_settings().unwrap();
        assert_eq!(dispatcher.server_url(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn invalid_server_url_is_rejected_before_storing() {
        let dispatcher = dispatcher();
        let err = dispatcher.set_server_url("my hub.local").unwrap_err();
        assert!(matches!(err, Error::Storage(_)), "got: {err:?}");
        assert_eq!(dispatcher.settings().server_url(), DEFAULT_SERVER_URL);
        assert_eq!(dispatcher.server_url(), DEFAULT_SERVER_URL);
    }

    #[tokio::test]
    async fn corrupt_stored_url_does_not_block_demo_mode() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(SERVER_URL_KEY, "http://my hub.local/api")
            .unwrap();

        let dispatcher = Dispatcher::with_demo_source(
            store,
            TransportConfig::default(),
            DemoDataSource::with_seed(3).with_latency(std::time::Duration::ZERO),
        )
        .unwrap();
        assert_eq!(dispatcher.server_url(), "http://my hub.local/api");

        let live = dispatcher.request(ApiRequest::get("/devices")).await;
        assert!(matches!(live, Err(Error::InvalidUrl(_))), "got: {live:?}");
        assert!(!dispatcher.test_connection().await.connected);

        dispatcher.set_demo_mode(true).unwrap();
        let devices = dispatcher.request(ApiRequest::get("/devices")).await.unwrap();
        assert_eq!(devices.as_array().unwrap().len(), 5);

        dispatcher.set_server_url("hub.local:8080").unwrap();
        assert_eq!(dispatcher.server_url(), "http://hub.local:8080/api");
    }

    #[tokio::test]
    async fn demo_connection_test_needs_no_network() {
        let dispatcher = dispatcher();
        dispatcher.set_demo_mode(true).unwrap();
        assert_eq!(
            dispatcher.test_connection().await,
            ConnectionStatus::connected()
        );
    }

    #[test]
    fn session_signal_tracks_login_and_logout() {
        let dispatcher = dispatcher();
        let rx = dispatcher.session();

        dispatcher
            .begin_session("t0k3n", &serde_json::json!({ "id": "u1" }))
            .unwrap();
        assert_eq!(*rx.borrow(), SessionState::Authenticated);

        dispatcher.end_session().unwrap();
        assert_eq!(*rx.borrow(), SessionState::Anonymous);
        assert!(session::token(dispatcher.store().as_ref()).is_none());
    }
}
