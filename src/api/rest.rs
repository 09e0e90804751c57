use crate::config::ApiConfig;
use crate::db::repositories::MonitoringLogsRepository;
use crate::error::Error;
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

pub mod monitoring_controller;


// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub logs_repo: MonitoringLogsRepository,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub detail: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status: status.as_u16(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(_) => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Request handler panicked: {}", detail);

    ApiError::internal(format!("Internal server error: {}", detail)).into_response()
}

/// Build the application router with CORS and panic isolation applied
pub fn router(state: AppState) -> Router {
    // Allow any origin, method and header; there are no credentials to protect
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin)
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/", get(monitoring_controller::root))
        .route("/health", get(monitoring_controller::health_check))
        .route("/api/log-summary", post(monitoring_controller::log_summary))
        .route("/api/logs/today", get(monitoring_controller::get_today_logs))
        .route("/api/stats", get(monitoring_controller::get_stats))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

pub struct RestApi {
    config: ApiConfig,
    logs_repo: MonitoringLogsRepository,
}

impl RestApi {
    pub fn new(config: &ApiConfig, logs_repo: MonitoringLogsRepository) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            logs_repo,
        })
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.logs_repo.ensure_directory().await?;

        let app = router(AppState {
            logs_repo: self.logs_repo.clone(),
        });

        // Build the server address
        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr.parse()?;

        let listener = TcpListener::bind(addr).await?;
        info!("API server listening on {}", listener.local_addr()?);
        info!("Health check: http://localhost:{}/health", self.config.port);
        info!(
            "Writing daily logs under {}",
            self.logs_repo.logs_directory().display()
        );

        axum::Server::from_tcp(listener.into_std()?)?
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server stopped");
        Ok(())
    }
}
