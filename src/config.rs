use anyhow::Result;
use compute::DashboardRepository;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Runtime settings of the web server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
    pub cache_ttl_secs: u64,
    /// Base URL of the text-to-SQL service, without trailing slash
    pub ai_service_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://invoices.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:4000".to_string(),
            cache_ttl_secs: 60,
            cors_origin: "*".to_string(),
            ai_service_url: "http://localhost:8000".to_string(),
        }
    }
}

impl AppConfig {
    /// Endpoint the chat proxy forwards questions to.
    pub fn chat_endpoint(&self) -> String {
        format!("{}/api/v1/chat", self.ai_service_url.trim_end_matches('/'))
    }
}

/// Initialize application state around an already opened repository
pub fn initialize_app_state(
    config: AppConfig,
    repo: Arc<dyn DashboardRepository>,
) -> Result<AppState> {
    debug!("AI service endpoint: {}", config.chat_endpoint());

    // Initialize cache
    let cache = Cache::builder()
        .max_capacity(100)
        .time_to_live(Duration::from_secs(config.cache_ttl_secs))
        .build();

    // No request timeout: the AI service may need a cold start
    let http = reqwest::Client::builder().build()?;

    info!(ttl_secs = config.cache_ttl_secs, "Application state initialized");
    Ok(AppState {
        repo,
        cache,
        http,
        config: Arc::new(config),
    })
}
