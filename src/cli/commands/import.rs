use anyhow::{Context, Result};
use compute::{RawDocument, clear_invoice_data, ingest_documents};
use sea_orm::Database;
use std::fs;
use tracing::{debug, info, warn};

/// Loads extracted invoice documents from `json_path` into the database.
pub async fn import(json_path: &str, database_url: &str, truncate: bool) -> Result<()> {
    info!("Importing invoice documents from {}", json_path);

    let content = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file at {}", json_path))?;
    let documents: Vec<RawDocument> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of documents", json_path))?;
    info!("Found {} documents to process", documents.len());

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    debug!("Connected to database");

    if truncate {
        clear_invoice_data(&db).await?;
    }

    let summary = ingest_documents(&db, &documents).await?;
    info!("Successfully created {} invoices", summary.created);
    if summary.skipped > 0 {
        warn!("Skipped {} documents due to missing data", summary.skipped);
    }
    if summary.failed > 0 {
        warn!("{} documents failed and were rolled back", summary.failed);
    }

    db.close().await?;
    Ok(())
}
