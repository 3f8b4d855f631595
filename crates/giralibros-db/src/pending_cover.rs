use chrono::{DateTime, Utc};
use giralibros_core::models::PendingCover;
use giralibros_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for covers staged before their book exists.
///
/// Consumption is a row-locked lookup plus delete in one transaction, so a
/// handle can be consumed at most once: of two racing consumers (or a
/// consume racing the sweep), whichever deletes first wins and the other
/// observes absence.
#[derive(Clone)]
pub struct PendingCoverRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PendingCoverRow {
    id: Uuid,
    user_id: Uuid,
    storage_key: String,
    created_at: DateTime<Utc>,
}

impl From<PendingCoverRow> for PendingCover {
    fn from(row: PendingCoverRow) -> Self {
        PendingCover {
            id: row.id,
            user_id: row.user_id,
            storage_key: row.storage_key,
            created_at: row.created_at,
        }
    }
}

impl PendingCoverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a staged cover. Each call creates an independent row; the id is
    /// the opaque handle handed back to the client.
    pub async fn stage(
        &self,
        id: Uuid,
        user_id: Uuid,
        storage_key: &str,
    ) -> Result<PendingCover, AppError> {
        let row = sqlx::query_as::<_, PendingCoverRow>(
            r#"
            INSERT INTO pending_covers (id, user_id, storage_key)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, storage_key, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(storage_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Atomically claim a staged cover: look the row up with a lock, verify
    /// ownership, delete it, and return its storage key.
    ///
    /// `NotFound` when no live row matches the handle; `Forbidden` when the
    /// row belongs to a different user (the row is left intact).
    pub async fn consume(&self, handle: Uuid, owner: Uuid) -> Result<String, AppError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT user_id, storage_key FROM pending_covers WHERE id = $1 FOR UPDATE",
        )
        .bind(handle)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_id, storage_key) = match row {
            Some(row) => row,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Pending cover not found".to_string()));
            }
        };

        if user_id != owner {
            tx.rollback().await?;
            return Err(AppError::Forbidden(format!(
                "pending cover {} staged by another user",
                handle
            )));
        }

        sqlx::query("DELETE FROM pending_covers WHERE id = $1")
            .bind(handle)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(storage_key)
    }

    /// Delete every staged cover created before `cutoff`, regardless of
    /// owner. Returns the storage keys of the removed rows so the caller can
    /// drop the objects too.
    pub async fn sweep(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "DELETE FROM pending_covers WHERE created_at < $1 RETURNING storage_key",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}
