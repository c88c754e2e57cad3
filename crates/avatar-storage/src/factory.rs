#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-memory")]
use crate::MemoryStorage;
use crate::{Storage, StorageBackend, StorageResult};
use avatar_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path(),
                config.local_storage_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(crate::StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; avatars will not survive a restart");
            Ok(Arc::new(MemoryStorage::new(
                config.local_storage_base_url(),
            )))
        }

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(crate::StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::AvatarConfig;

    #[tokio::test]
    async fn test_create_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut inner = AvatarConfig::default();
        inner.local_storage_path = dir.path().to_string_lossy().to_string();
        let storage = create_storage(&Config(Box::new(inner))).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let mut inner = AvatarConfig::default();
        inner.storage_backend = StorageBackend::Memory;
        let storage = create_storage(&Config(Box::new(inner))).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
        assert_eq!(
            storage.public_url("avatars/x.png"),
            "http://localhost:3000/media/avatars/x.png"
        );
    }
}
