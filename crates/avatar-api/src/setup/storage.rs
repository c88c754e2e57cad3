use anyhow::{Context, Result};
use avatar_core::Config;
use avatar_services::{create_storage, Storage};
use std::sync::Arc;

/// Create the configured storage backend
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        path = %config.local_storage_path(),
        base_url = %config.local_storage_base_url(),
        "Storage initialized"
    );

    Ok(storage)
}
