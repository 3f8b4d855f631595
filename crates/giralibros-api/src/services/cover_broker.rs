//! Bridges "cover ready" and "book exists".
//!
//! Normalized covers either attach directly to an existing book or are staged
//! under an opaque handle until the form that references them is submitted.
//! Staged covers that are never claimed get removed by the age-based sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};
use giralibros_core::models::PendingCover;
use giralibros_core::AppError;
use giralibros_db::{OfferedBookRepository, PendingCoverRepository};
use giralibros_processing::NormalizedCover;
use giralibros_storage::{keys, Storage, StorageError};
use uuid::Uuid;

use crate::error::storage_error_to_app;

#[derive(Clone)]
pub struct CoverBroker {
    pending: PendingCoverRepository,
    books: OfferedBookRepository,
    storage: Arc<dyn Storage>,
}

impl CoverBroker {
    pub fn new(
        pending: PendingCoverRepository,
        books: OfferedBookRepository,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            pending,
            books,
            storage,
        }
    }

    /// Stage a normalized cover for a book that does not exist yet.
    ///
    /// Writes the object first, then the row; a failed insert cleans the
    /// object up so a client never holds a handle to nothing.
    pub async fn stage(
        &self,
        owner: Uuid,
        cover: &NormalizedCover,
    ) -> Result<(PendingCover, String), AppError> {
        let handle = Uuid::new_v4();
        let key = keys::pending_cover_key(handle);

        let url = self
            .storage
            .put(&key, cover.bytes.to_vec(), "image/jpeg")
            .await
            .map_err(storage_error_to_app)?;

        match self.pending.stage(handle, owner, &key).await {
            Ok(pending) => {
                tracing::info!(handle = %handle, owner = %owner, "Staged cover");
                Ok((pending, url))
            }
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&key).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        storage_key = %key,
                        "Failed to clean up staged object after DB error"
                    );
                }
                Err(e)
            }
        }
    }

    /// Attach a freshly normalized cover directly to an owned book, replacing
    /// (and discarding) any previous cover object.
    pub async fn attach_normalized(
        &self,
        book_id: Uuid,
        owner: Uuid,
        cover: &NormalizedCover,
    ) -> Result<String, AppError> {
        let cover_key = keys::book_cover_key(Uuid::new_v4());

        let url = self
            .storage
            .put(&cover_key, cover.bytes.to_vec(), "image/jpeg")
            .await
            .map_err(storage_error_to_app)?;

        match self.books.set_cover(book_id, owner, &cover_key, &url).await {
            Ok(old_key) => {
                self.discard_object(old_key.as_deref()).await;
                Ok(url)
            }
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&cover_key).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        storage_key = %cover_key,
                        "Failed to clean up cover object after DB error"
                    );
                }
                Err(e)
            }
        }
    }

    /// Claim a staged handle for a saved book.
    ///
    /// A missing or already-consumed handle (row or object) is a soft miss:
    /// the book keeps whatever cover it had, the omission is logged, and
    /// `Ok(None)` is returned. Ownership violations stay hard errors.
    pub async fn attach_staged(
        &self,
        book_id: Uuid,
        owner: Uuid,
        handle: Uuid,
    ) -> Result<Option<String>, AppError> {
        let pending_key = match self.pending.consume(handle, owner).await {
            Ok(key) => key,
            Err(AppError::NotFound(_)) => {
                tracing::warn!(
                    handle = %handle,
                    book_id = %book_id,
                    "Staged cover expired or already consumed; saving book without it"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let cover_key = keys::book_cover_key(Uuid::new_v4());
        let url = match self.storage.copy(&pending_key, &cover_key).await {
            Ok(url) => url,
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    handle = %handle,
                    book_id = %book_id,
                    storage_key = %pending_key,
                    "Staged cover object missing; saving book without it"
                );
                return Ok(None);
            }
            Err(e) => return Err(storage_error_to_app(e)),
        };

        let old_key = self.books.set_cover(book_id, owner, &cover_key, &url).await?;
        self.discard_object(old_key.as_deref()).await;
        self.discard_object(Some(&pending_key)).await;

        tracing::info!(handle = %handle, book_id = %book_id, "Attached staged cover");

        Ok(Some(url))
    }

    /// Delete every staged cover older than `max_age`, rows and objects both.
    /// Returns the number removed. Safe to run concurrently with stage and
    /// consume: the row delete decides who wins.
    pub async fn sweep(&self, max_age: Duration) -> Result<u64, AppError> {
        let cutoff = Utc::now() - max_age;
        let keys = self.pending.sweep(cutoff).await?;
        let removed = keys.len() as u64;

        for key in &keys {
            self.discard_object(Some(key)).await;
        }

        tracing::info!(removed = removed, cutoff = %cutoff, "Swept expired staged covers");

        Ok(removed)
    }

    /// Best-effort object deletion; the row is authoritative, so a failed
    /// object delete is logged and not propagated.
    pub async fn discard_object(&self, key: Option<&str>) {
        if let Some(key) = key {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(error = %e, storage_key = %key, "Failed to delete cover object");
            }
        }
    }

    /// Public URL for a stored cover, for responses that only have the key.
    pub fn url_for(&self, key: &str) -> String {
        self.storage.url_for(key)
    }
}
