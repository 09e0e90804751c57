pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use error::Error;

// Re-export main components for easier use
pub use api::rest::{router, AppState, RestApi};
pub use db::models::{LogRecord, MonitoringMetadata, MonitoringStats, SummaryLogRequest};
pub use db::repositories::MonitoringLogsRepository;
