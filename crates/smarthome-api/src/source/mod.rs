// Data source strategy
//
// The dispatcher picks exactly one `DataSource` per call: the live HTTP
// backend or the in-memory demo repository. Both take the same
// `ApiRequest` and answer with the unwrapped JSON payload.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::request::ApiRequest;

pub mod live;

pub use live::LiveDataSource;

/// Which side served a request (for logging and diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Demo,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Demo => "demo",
        })
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Serve one request. Resolves exactly once; no retries.
    async fn execute(&self, request: &ApiRequest) -> Result<Value, Error>;
}
