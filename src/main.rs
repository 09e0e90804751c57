use anyhow::Result;
use incar_monitor_backend::{config, logging, MonitoringLogsRepository, RestApi};
use log::{info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

async fn run_app() -> Result<()> {
    let config = config::load_from_env()?;

    // Initialize logging
    logging::init(&config.api);
    info!(
        "Starting In-Car Monitoring Backend v{}",
        env!("CARGO_PKG_VERSION")
    );

    let logs_repo = MonitoringLogsRepository::new(&config.storage);
    info!("Current log file: {}", logs_repo.current_log_path().display());

    let http_server = RestApi::new(&config.api, logs_repo)?;
    http_server.run(shutdown_signal()).await?;

    Ok(())
}

fn main() {
    // A single-threaded runtime: one worker appends to the daily log
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_app()) {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
