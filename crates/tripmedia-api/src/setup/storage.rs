//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tripmedia_core::Config;
use tripmedia_storage::{create_storage, Storage};

/// Build the single blob store client shared by every request
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        bucket = config.s3_bucket(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
