pub mod monitoring_models;

pub use monitoring_models::{
    iso_now, LogRecord, MonitoringMetadata, MonitoringStats, SummaryLogRequest,
};
