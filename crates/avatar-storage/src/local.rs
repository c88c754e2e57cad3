use crate::traits::{join_url, validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./data/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, refusing anything that would
    /// resolve outside the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` next to `path` and rename it into place.
    async fn write_atomically(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?;
        let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let result = async {
            let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            file.write_all(data).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to sync file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            fs::rename(&tmp_path, path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move {} into place: {}",
                    path.display(),
                    e
                ))
            })
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path).await;
        }
        result
    }

    /// Remove empty directories between `path` and the base directory.
    async fn prune_empty_dirs(&self, path: &Path) {
        let mut current = path.parent().map(Path::to_path_buf);
        while let Some(dir) = current {
            if dir == self.base_path || dir.strip_prefix(&self.base_path).is_err() {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk
            if fs::remove_dir(&dir).await.is_err() {
                break;
            }
            current = dir.parent().map(Path::to_path_buf);
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        self.write_atomically(&path, &data).await?;

        let url = self.public_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload_with_key successful"
        );

        Ok(url)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        self.prune_empty_dirs(&path).await;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        let path = self.key_to_path(prefix.trim_end_matches('/'))?;

        match fs::remove_dir_all(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete directory {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        self.prune_empty_dirs(&path).await;

        tracing::info!(path = %path.display(), prefix = %prefix, "Local storage prefix deleted");
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_url(&self.base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = b"test data".to_vec();
        let url = storage
            .upload_with_key("avatars/a/g/original.png", data.clone(), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/avatars/a/g/original.png");

        let downloaded = storage.download("avatars/a/g/original.png").await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_object() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload_with_key("avatars/a/slot.json", b"first version".to_vec(), "application/json")
            .await
            .unwrap();
        storage
            .upload_with_key("avatars/a/slot.json", b"v2".to_vec(), "application/json")
            .await
            .unwrap();

        assert_eq!(storage.download("avatars/a/slot.json").await.unwrap(), b"v2");

        // No temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("avatars/a"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_nonexistent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.delete("nonexistent/file.png").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_prunes_empty_generation_dirs() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload_with_key("avatars/a/g1/80x80.png", b"x".to_vec(), "image/png")
            .await
            .unwrap();
        storage.delete("avatars/a/g1/80x80.png").await.unwrap();

        assert!(!dir.path().join("avatars/a/g1").exists());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn test_delete_prefix_removes_whole_slot() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        for key in [
            "avatars/a/slot.json",
            "avatars/a/g1/original.png",
            "avatars/a/g2/40x40.png",
        ] {
            storage.upload_with_key(key, b"x".to_vec(), "image/png").await.unwrap();
        }
        storage
            .upload_with_key("avatars/ab/g1/original.png", b"y".to_vec(), "image/png")
            .await
            .unwrap();

        storage.delete_prefix("avatars/a").await.unwrap();

        assert!(!dir.path().join("avatars/a").exists());
        assert!(storage.exists("avatars/ab/g1/original.png").await.unwrap());

        // Already gone
        storage.delete_prefix("avatars/a/").await.unwrap();
        assert!(matches!(
            storage.delete_prefix("../outside").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("avatars/missing.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!storage.exists("avatars/missing.png").await.unwrap());
    }
}
