use crate::api::rest::{ApiError, ApiResult, AppState};
use crate::db::models::monitoring_models::{
    iso_now, LogRecord, MonitoringStats, SummaryLogRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const NO_LOGS_MESSAGE: &str = "No logs for today";

/// Response for the root liveness check
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub timestamp: String,
    pub status: String,
}

/// Response for the detailed health check
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub logs_directory: String,
    pub current_log_file: String,
}

/// Response for an accepted summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryLogResponse {
    pub status: String,
    pub message: String,
    pub log_id: Uuid,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodayLogsResponse {
    Logs {
        logs: Vec<LogRecord>,
        count: usize,
        log_file: String,
    },
    Empty {
        logs: Vec<LogRecord>,
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Stats {
        stats: MonitoringStats,
        log_file: String,
    },
    /// No file yet; the stats object carries zero counts
    Empty {
        message: String,
        stats: MonitoringStats,
    },
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "In-Car Monitoring Backend is running".to_string(),
        timestamp: iso_now(),
        status: "healthy".to_string(),
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: iso_now(),
        logs_directory: state.logs_repo.logs_directory().display().to_string(),
        current_log_file: state.logs_repo.current_log_path().display().to_string(),
    })
}

/// Validate a summary from the monitoring app and append it to today's log
pub async fn log_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryLogRequest>, JsonRejection>,
) -> ApiResult<Json<SummaryLogResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected summary payload: {}", rejection.body_text());
        ApiError::new(rejection.status(), rejection.body_text())
    })?;

    if let Err(e) = request.validate() {
        warn!("Rejected summary for session {}: {}", request.session_id, e);
        return Err(e.into());
    }

    let session_id = request.session_id.clone();
    let record = LogRecord::from_request(request);

    let (_, stored) = state.logs_repo.append(record).await.map_err(|e| {
        error!("Failed to log to file: {}", e);
        ApiError::internal("Failed to log summary to file")
    })?;

    info!("Successfully logged summary for session {}", session_id);

    Ok(Json(SummaryLogResponse {
        status: "success".to_string(),
        message: "Summary logged successfully".to_string(),
        log_id: stored.log_id,
        timestamp: stored.timestamp,
    }))
}

/// Every record of today's file, for debugging and monitoring
pub async fn get_today_logs(State(state): State<AppState>) -> ApiResult<Json<TodayLogsResponse>> {
    let path = state.logs_repo.current_log_path();

    let logs = state.logs_repo.read_log_file(&path).await.map_err(|e| {
        error!("Error reading logs: {}", e);
        ApiError::internal("Failed to read logs")
    })?;

    let response = match logs {
        Some(logs) => TodayLogsResponse::Logs {
            count: logs.len(),
            logs,
            log_file: path.display().to_string(),
        },
        None => TodayLogsResponse::Empty {
            logs: Vec::new(),
            message: NO_LOGS_MESSAGE.to_string(),
        },
    };

    Ok(Json(response))
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let path = state.logs_repo.current_log_path();

    let logs = state.logs_repo.read_log_file(&path).await.map_err(|e| {
        error!("Error calculating stats: {}", e);
        ApiError::internal("Failed to calculate stats")
    })?;

    let response = match logs {
        Some(logs) => StatsResponse::Stats {
            stats: MonitoringStats::from_records(&logs),
            log_file: path.display().to_string(),
        },
        None => StatsResponse::Empty {
            message: NO_LOGS_MESSAGE.to_string(),
            stats: MonitoringStats::default(),
        },
    };

    Ok(Json(response))
}
