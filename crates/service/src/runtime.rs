//! Runtime environment helpers
//!
//! Builds the entity store the configuration asks for.

use std::sync::Arc;

use configs::{StorageBackend, StorageConfig};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{EntityStore, JsonFileBackend, KeyBuilder, KeyValueBackend, MemoryBackend};

/// Ensure the data directory for a file-backed store exists.
pub async fn ensure_env(cfg: &StorageConfig) -> anyhow::Result<()> {
    if cfg.backend == StorageBackend::File {
        common::env::ensure_data_file_dir(&cfg.path).await?;
    }
    Ok(())
}

/// Open the configured backend and wrap it in an [`EntityStore`].
pub fn open_entity_store(cfg: &StorageConfig) -> Result<EntityStore, ServiceError> {
    let keys = KeyBuilder::new(cfg.key_root.clone(), cfg.key_delimiter.clone())?;
    let backend: Arc<dyn KeyValueBackend> = match cfg.backend {
        StorageBackend::File => Arc::new(
            JsonFileBackend::open(&cfg.path).map_err(|e| ServiceError::Storage(e.into()))?,
        ),
        StorageBackend::Memory => Arc::new(MemoryBackend::new()),
    };
    info!(backend = ?cfg.backend, root = %keys.root(), delimiter = %keys.delimiter(), "entity store opened");
    Ok(EntityStore::new(backend, keys))
}
