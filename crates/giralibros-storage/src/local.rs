use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Cover storage on the local filesystem, served under a static media URL.
#[derive(Clone)]
pub struct LocalStorage {
    media_root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Open (and create if needed) the media root.
    pub async fn new(media_root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let media_root = media_root.into();

        fs::create_dir_all(&media_root).await.map_err(|e| {
            StorageError::Config(format!(
                "cannot create media root {}: {}",
                media_root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            media_root,
            base_url,
        })
    }

    /// Map a key to a path under the media root, refusing keys that escape it.
    ///
    /// The textual check catches `..` and absolute keys up front; for paths
    /// that already exist, canonicalization re-verifies against the real root
    /// (symlinks inside the media tree could otherwise point out of it).
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "key escapes the media root: {}",
                key
            )));
        }

        let path = self.media_root.join(key);

        let real_root = self
            .media_root
            .canonicalize()
            .map_err(|e| StorageError::Config(format!("media root unresolvable: {}", e)))?;
        if let Ok(real) = path.canonicalize() {
            if !real.starts_with(&real_root) {
                return Err(StorageError::InvalidKey(format!(
                    "key escapes the media root: {}",
                    key
                )));
            }
        }

        Ok(path)
    }

    async fn make_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.resolve(storage_key)?;
        self.make_parent(&path).await?;

        // write_all then sync_all: once put returns, the bytes are durable.
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(key = %storage_key, size_bytes = data.len(), "Stored cover object");

        Ok(self.url_for(storage_key))
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, "Deleted cover object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        let from = self.resolve(from_key)?;
        let to = self.resolve(to_key)?;
        self.make_parent(&to).await?;

        match fs::copy(&from, &to).await {
            Ok(_) => {
                tracing::info!(from = %from_key, to = %to_key, "Copied cover object");
                Ok(self.url_for(to_key))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(from_key.to_string()))
            }
            Err(e) => Err(StorageError::WriteFailed(format!(
                "copy {} -> {}: {}",
                from.display(),
                to.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn url_for(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key)
    }
}
