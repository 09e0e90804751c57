pub mod monitoring_logs;

pub use monitoring_logs::MonitoringLogsRepository;
