//! The backend seam cover persistence goes through.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("read failed: {0}")]
    ReadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("no object under key: {0}")]
    NotFound(String),

    #[error("bad storage key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("storage misconfigured: {0}")]
    Config(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage for normalized covers.
///
/// Keys come from [crate::keys]; backends treat them as opaque relative paths
/// and must refuse anything that would escape their root.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store an object under the given key. Returns the public URL.
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<String>;

    /// Fetch an object by key.
    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Copy an object to another key (consuming a staged cover onto a book).
    /// Returns the public URL of the destination.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String>;

    /// Check if an object exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Public URL for a key.
    fn url_for(&self, storage_key: &str) -> String;
}
