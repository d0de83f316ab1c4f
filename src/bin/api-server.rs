//! Plantwatch API Server
//!
//! Read-only HTTP API over the latest published classification and risk cycles.
//! Stateless apart from its snapshot cache, so it can be horizontally scaled.

use dotenvy::dotenv;
use plantwatch::config::ApiConfig;
use plantwatch::core::http::start_server;
use plantwatch::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = ApiConfig::from_env();

    let env = plantwatch::config::get_environment();
    info!("Starting Plantwatch API Server");
    info!(environment = %env, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);
    info!(
        refresh_seconds = config.snapshot_refresh.as_secs(),
        "Snapshot refresh every {}s",
        config.snapshot_refresh.as_secs()
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
