// Demo data source
//
// Serves every request from an in-memory repository after an artificial
// delay, so the dashboard behaves like it is talking to a real backend.

mod fixtures;
pub mod repository;
pub mod routes;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use repository::DemoRepository;
pub use routes::Route;

use crate::error::Error;
use crate::request::ApiRequest;
use crate::source::{DataSource, SourceKind};

/// Simulated network latency of demo responses.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct DemoDataSource {
    repository: Mutex<DemoRepository>,
    latency: Duration,
}

impl Default for DemoDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoDataSource {
    pub fn new() -> Self {
        Self::with_repository(DemoRepository::new())
    }

    /// Deterministic histories and ids, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_repository(DemoRepository::with_seed(seed))
    }

    pub fn with_repository(repository: DemoRepository) -> Self {
        Self {
            repository: Mutex::new(repository),
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Run `f` against the repository state.
    pub fn inspect<R>(&self, f: impl FnOnce(&DemoRepository) -> R) -> R {
        let repository = self
            .repository
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&repository)
    }
}

#[async_trait]
impl DataSource for DemoDataSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Demo
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Value, Error> {
        tokio::time::sleep(self.latency).await;

        let response = {
            let mut repository = self
                .repository
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            repository.handle(request)
        };
        Ok(response)
    }
}
