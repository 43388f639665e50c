use anyhow::Result;
use compute::SeaOrmRepository;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

use super::serve::run_server;
use crate::config::AppConfig;

pub async fn migrate_and_serve(config: AppConfig) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", config.database_url);

    let repo = match SeaOrmRepository::connect(&config.database_url).await {
        Ok(repo) => repo,
        Err(e) => {
            error!("Failed to connect to database '{}': {}", config.database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    match Migrator::up(repo.connection(), None).await {
        Ok(_) => info!("Database migrations completed successfully"),
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    // Same pool serves the API
    run_server(config, Arc::new(repo)).await
}
