// smarthome-api: Async dual-mode client for the smart-home dashboard backend (live HTTP + in-memory demo)

pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod request;
pub mod resources;
pub mod session;
pub mod source;
pub mod transport;

pub use demo::DemoDataSource;
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use models::{
    CommandOutcome, ConnectionStatus, DashboardEvent, DashboardStats, Device, DeviceCommand,
    DeviceDraft, Interval, LockEvent, Notification, NotificationFilter, TelemetryPoint, User,
};
pub use request::ApiRequest;
pub use resources::{Credentials, SmartHome};
pub use session::SessionState;
pub use source::{DataSource, LiveDataSource, SourceKind};
pub use transport::TransportConfig;
