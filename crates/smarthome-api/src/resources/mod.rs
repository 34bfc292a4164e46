// Resource wrappers
//
// `SmartHome` exposes one method per backend operation. Each method issues
// exactly one dispatcher call; whether the live backend or the demo
// repository answers is decided by the dispatcher.

mod devices;
mod locations;
mod notifications;
mod scenarios;
mod stats;
mod users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use smarthome_config::KeyValueStore;

pub use users::Credentials;

use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::request::ApiRequest;
use crate::transport::TransportConfig;

/// High-level client for the smart-home backend.
#[derive(Debug, Clone)]
pub struct SmartHome {
    dispatcher: Dispatcher,
}

impl SmartHome {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Dispatcher over `store` with default demo settings.
    pub fn open(store: Arc<dyn KeyValueStore>, transport: TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(Dispatcher::new(store, transport)?))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ── Shared request helpers ───────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T, Error> {
        self.dispatcher.request_as(ApiRequest::get(path)).await
    }

    async fn get_value(&self, path: impl Into<String>) -> Result<Value, Error> {
        self.dispatcher.request(ApiRequest::get(path)).await
    }

    async fn post_value(&self, path: impl Into<String>, body: Option<Value>) -> Result<Value, Error> {
        let mut request = ApiRequest::post(path);
        request.body = body;
        self.dispatcher.request(request).await
    }

    async fn put_value(&self, path: impl Into<String>, body: Option<Value>) -> Result<Value, Error> {
        let mut request = ApiRequest::put(path);
        request.body = body;
        self.dispatcher.request(request).await
    }

    async fn delete_value(&self, path: impl Into<String>) -> Result<Value, Error> {
        self.dispatcher.request(ApiRequest::delete(path)).await
    }
}
