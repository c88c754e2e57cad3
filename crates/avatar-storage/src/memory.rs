//! In-memory storage backend.
//!
//! Objects live in a process-local map and vanish on restart. Used for tests and
//! for running the service without a writable disk.

use crate::traits::{dir_prefix, join_url, validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

#[derive(Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// All keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Content type an object was written with.
    pub async fn content_type(&self, storage_key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.content_type.clone())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("http://localhost:3000/media")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;

        let size = data.len();
        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        tracing::debug!(key = %storage_key, size_bytes = size, "Memory storage upload");

        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        validate_key(storage_key)?;
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        self.objects.write().await.remove(storage_key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        validate_key(prefix)?;
        let dir = dir_prefix(prefix);
        self.objects
            .write()
            .await
            .retain(|key, _| !key.starts_with(&dir));
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_url(&self.base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
