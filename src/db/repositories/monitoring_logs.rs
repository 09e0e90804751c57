use crate::config::StorageConfig;
use crate::db::models::monitoring_models::{iso_now, LogRecord};
use crate::error::Error;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Daily append-only log store backed by newline-delimited JSON files
#[derive(Clone)]
pub struct MonitoringLogsRepository {
    logs_dir: Arc<Path>,
    extension: Arc<str>,
    // Serializes open+write+flush so concurrent requests never interleave lines
    append_lock: Arc<Mutex<()>>,
}

impl MonitoringLogsRepository {
    /// Create a new repository over the configured logs directory
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            logs_dir: Arc::from(config.logs_directory.as_path()),
            extension: Arc::from(config.file_extension.as_str()),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn logs_directory(&self) -> &Path {
        &self.logs_dir
    }

    /// Path of today's file. Recomputed on every call so the file rolls over
    /// at local midnight without restarting the process.
    pub fn current_log_path(&self) -> PathBuf {
        self.log_path_for(Local::now().date_naive())
    }

    pub fn log_path_for(&self, date: NaiveDate) -> PathBuf {
        self.logs_dir.join(format!(
            "monitoring_logs_{}.{}",
            date.format("%Y-%m-%d"),
            self.extension
        ))
    }

    /// Create the logs directory if it does not exist yet
    pub async fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.logs_dir).await.map_err(|e| {
            Error::Io(format!(
                "Failed to create logs directory {}: {}",
                self.logs_dir.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Append one record to today's file and return it as written.
    ///
    /// `server_timestamp` is set at the moment of persistence. The target file
    /// is chosen after the lock is taken, so the record lands in the file of
    /// the day it was actually written.
    pub async fn append(&self, mut record: LogRecord) -> Result<(PathBuf, LogRecord)> {
        let _guard = self.append_lock.lock().await;

        record.server_timestamp = iso_now();
        let mut line = serde_json::to_string(&record).map_err(Error::from)?;
        line.push('\n');

        self.ensure_directory().await?;
        let path = self.current_log_path();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| Error::Io(format!("Failed to flush {}: {}", path.display(), e)))?;

        info!("Logged summary to {}", path.display());
        Ok((path, record))
    }

    /// All records of today's file, empty when nothing was logged today
    pub async fn read_all(&self) -> Result<Vec<LogRecord>> {
        let path = self.current_log_path();
        Ok(self.read_log_file(&path).await?.unwrap_or_default())
    }

    /// Read every record of one daily file.
    ///
    /// Returns `None` when the file does not exist. Blank lines are skipped;
    /// any malformed line fails the whole read.
    pub async fn read_log_file(&self, path: &Path) -> Result<Option<Vec<LogRecord>>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(
                    Error::Io(format!("Failed to read {}: {}", path.display(), e)).into(),
                )
            }
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: LogRecord = serde_json::from_str(line).map_err(|e| {
                Error::Serialization(format!(
                    "Malformed record at {}:{}: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        debug!("Read {} records from {}", records.len(), path.display());
        Ok(Some(records))
    }
}
