use crate::error::Error;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Current local wall-clock time as ISO-8601 without offset,
/// e.g. `2024-05-01T14:03:22.123456`.
pub fn iso_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Per-summary metrics reported by the in-car monitoring app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringMetadata {
    pub frames_processed: u64,
    pub people_detected: u64,
    pub processing_time_seconds: f64,
    pub video_source: String,
    pub inference_time_ms: f64,
    pub total_detections: u64,
}

impl MonitoringMetadata {
    /// Reject real-valued metrics that are negative or not finite.
    /// Integer metrics are already unsigned after deserialization.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("processingTimeSeconds", self.processing_time_seconds),
            ("inferenceTimeMs", self.inference_time_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(format!(
                    "metadata.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Inbound payload of `POST /api/log-summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryLogRequest {
    pub session_id: String,
    pub summary: String,
    pub metadata: MonitoringMetadata,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl SummaryLogRequest {
    pub fn validate(&self) -> Result<(), Error> {
        self.metadata.validate()
    }
}

/// One persisted line of a daily log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub log_id: Uuid,
    pub session_id: String,
    #[serde(default)]
    pub client_timestamp: Option<String>,
    pub summary: String,
    pub metadata: MonitoringMetadata,
    /// Client timestamp when one was sent, otherwise the server time
    pub timestamp: String,
    pub server_timestamp: String,
}

impl LogRecord {
    /// Build a record with a fresh id. `server_timestamp` is restamped by the
    /// repository when the record is actually written.
    pub fn from_request(request: SummaryLogRequest) -> Self {
        let now = iso_now();
        let timestamp = request
            .timestamp
            .clone()
            .filter(|ts| !ts.is_empty())
            .unwrap_or_else(|| now.clone());

        Self {
            log_id: Uuid::new_v4(),
            session_id: request.session_id,
            client_timestamp: request.timestamp,
            summary: request.summary,
            metadata: request.metadata,
            timestamp,
            server_timestamp: now,
        }
    }
}

/// Aggregates over one day of records. Sums saturate at `u64::MAX`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringStats {
    pub total_logs: u64,
    pub unique_sessions: u64,
    pub total_frames_processed: u64,
    pub total_people_detected: u64,
}

impl MonitoringStats {
    pub fn from_records(records: &[LogRecord]) -> Self {
        let mut sessions = HashSet::new();
        let mut stats = Self::default();

        for record in records {
            stats.total_logs += 1;
            sessions.insert(record.session_id.as_str());
            stats.total_frames_processed = stats
                .total_frames_processed
                .saturating_add(record.metadata.frames_processed);
            stats.total_people_detected = stats
                .total_people_detected
                .saturating_add(record.metadata.people_detected);
        }

        stats.unique_sessions = sessions.len() as u64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(frames: u64, people: u64) -> MonitoringMetadata {
        MonitoringMetadata {
            frames_processed: frames,
            people_detected: people,
            processing_time_seconds: 1.5,
            video_source: "front_cam".to_string(),
            inference_time_ms: 42.0,
            total_detections: people,
        }
    }

    fn request(session: &str, timestamp: Option<&str>) -> SummaryLogRequest {
        SummaryLogRequest {
            session_id: session.to_string(),
            summary: "Two passengers, driver attentive".to_string(),
            metadata: metadata(120, 2),
            timestamp: timestamp.map(str::to_string),
        }
    }

    #[test]
    fn metadata_uses_camel_case_keys() {
        let value = serde_json::to_value(metadata(10, 3)).unwrap();
        assert_eq!(value["framesProcessed"], json!(10));
        assert_eq!(value["peopleDetected"], json!(3));
        assert_eq!(value["processingTimeSeconds"], json!(1.5));
        assert_eq!(value["videoSource"], json!("front_cam"));
        assert_eq!(value["inferenceTimeMs"], json!(42.0));
        assert_eq!(value["totalDetections"], json!(3));
        assert!(value.get("frames_processed").is_none());
    }

    #[test]
    fn negative_counts_fail_to_deserialize() {
        let body = json!({
            "framesProcessed": -1,
            "peopleDetected": 0,
            "processingTimeSeconds": 0.0,
            "videoSource": "cam",
            "inferenceTimeMs": 0.0,
            "totalDetections": 0
        });
        assert!(serde_json::from_value::<MonitoringMetadata>(body).is_err());
    }

    #[test]
    fn negative_durations_fail_validation() {
        let mut meta = metadata(1, 1);
        meta.inference_time_ms = -0.5;
        assert!(matches!(meta.validate(), Err(Error::Validation(_))));

        meta.inference_time_ms = f64::NAN;
        assert!(meta.validate().is_err());

        assert!(metadata(1, 1).validate().is_ok());
    }

    #[test]
    fn client_timestamp_wins_when_present() {
        let record = LogRecord::from_request(request("s1", Some("2024-05-01T10:00:00Z")));
        assert_eq!(record.timestamp, "2024-05-01T10:00:00Z");
        assert_eq!(record.client_timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_ne!(record.server_timestamp, record.timestamp);
    }

    #[test]
    fn server_time_used_without_client_timestamp() {
        let record = LogRecord::from_request(request("s1", None));
        assert!(record.client_timestamp.is_none());
        assert_eq!(record.timestamp, record.server_timestamp);
        assert!(chrono::NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[test]
    fn each_record_gets_a_fresh_id() {
        let a = LogRecord::from_request(request("s1", None));
        let b = LogRecord::from_request(request("s1", None));
        assert_ne!(a.log_id, b.log_id);
    }

    #[test]
    fn record_without_client_timestamp_key_still_parses() {
        let line = json!({
            "log_id": "5f0c3c56-7d0e-4c53-9a6e-1f5b8e3b2a10",
            "session_id": "s1",
            "summary": "ok",
            "metadata": serde_json::to_value(metadata(1, 0)).unwrap(),
            "timestamp": "2024-05-01T10:00:00",
            "server_timestamp": "2024-05-01T10:00:01"
        });
        let record: LogRecord = serde_json::from_value(line).unwrap();
        assert!(record.client_timestamp.is_none());
    }

    #[test]
    fn stats_count_sessions_and_sum_metrics() {
        let records: Vec<LogRecord> = ["a", "a", "b"]
            .iter()
            .map(|s| LogRecord::from_request(request(s, None)))
            .collect();

        let stats = MonitoringStats::from_records(&records);
        assert_eq!(stats.total_logs, 3);
        assert_eq!(stats.unique_sessions, 2);
        assert_eq!(stats.total_frames_processed, 360);
        assert_eq!(stats.total_people_detected, 6);
    }

    #[test]
    fn stats_sums_saturate_instead_of_overflowing() {
        let records: Vec<LogRecord> = (0..2)
            .map(|_| {
                let mut req = request("big", None);
                req.metadata = metadata(u64::MAX, u64::MAX);
                LogRecord::from_request(req)
            })
            .collect();

        let stats = MonitoringStats::from_records(&records);
        assert_eq!(stats.total_logs, 2);
        assert_eq!(stats.total_frames_processed, u64::MAX);
        assert_eq!(stats.total_people_detected, u64::MAX);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        assert_eq!(MonitoringStats::from_records(&[]), MonitoringStats::default());
    }
}
