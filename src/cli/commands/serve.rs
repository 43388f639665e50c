use anyhow::Result;
use compute::{DashboardRepository, SeaOrmRepository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{AppConfig, initialize_app_state};
use crate::router::create_router;

pub async fn serve(config: AppConfig) -> Result<()> {
    trace!("Entering serve function");
    debug!("Database URL: {}", config.database_url);

    let repo = match SeaOrmRepository::connect(&config.database_url).await {
        Ok(repo) => repo,
        Err(e) => {
            error!("Failed to connect to database '{}': {}", config.database_url, e);
            return Err(e.into());
        }
    };

    run_server(config, Arc::new(repo)).await
}

/// Serves the API on `config.bind_address` until Ctrl-C, then closes the repository.
pub async fn run_server(config: AppConfig, repo: Arc<dyn DashboardRepository>) -> Result<()> {
    let bind_address = config.bind_address.clone();

    // Initialize application state
    trace!("Initializing application state");
    let state = initialize_app_state(config, repo.clone())?;

    // Create router
    let app = create_router(state);
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Invoice dashboard API running on http://{}", bind_address);
    info!("OpenAPI document available at http://{}/api-docs/openapi.json", bind_address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!("Server error: {}", e);
    }

    repo.close().await?;
    info!("Server shutdown gracefully");
    Ok(served?)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}
