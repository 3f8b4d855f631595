use chrono::{DateTime, Utc};
use giralibros_core::models::{WantedBook, WantedBookRow};
use giralibros_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::with_transaction;

/// Repository for the books a user is looking for.
#[derive(Clone)]
pub struct WantedBookRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct WantedBookDbRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    author: String,
    created_at: DateTime<Utc>,
}

impl From<WantedBookDbRow> for WantedBook {
    fn from(row: WantedBookDbRow) -> Self {
        WantedBook {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            author: row.author,
            created_at: row.created_at,
        }
    }
}

impl WantedBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<WantedBook>, AppError> {
        let rows: Vec<WantedBookDbRow> = sqlx::query_as(
            "SELECT id, user_id, title, author, created_at FROM wanted_books WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Replace the user's wanted list with the submitted rows.
    pub async fn replace_all(
        &self,
        user_id: Uuid,
        rows: &[WantedBookRow],
    ) -> Result<(), AppError> {
        let rows = rows.to_vec();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query("DELETE FROM wanted_books WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;

                for row in &rows {
                    sqlx::query(
                        "INSERT INTO wanted_books (id, user_id, title, author) VALUES ($1, $2, $3, $4)",
                    )
                    .bind(Uuid::new_v4())
                    .bind(user_id)
                    .bind(&row.title)
                    .bind(&row.author)
                    .execute(&mut **tx)
                    .await?;
                }

                Ok(())
            })
        })
        .await
    }
}
