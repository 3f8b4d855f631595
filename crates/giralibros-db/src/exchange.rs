use chrono::{DateTime, Utc};
use giralibros_core::models::{ExchangeRequest, ExchangeRequestView};
use giralibros_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

const RECENT_LIMIT: i64 = 20;

/// Repository for exchange requests.
#[derive(Clone)]
pub struct ExchangeRequestRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ExchangeRequestDbRow {
    id: Uuid,
    from_user_id: Uuid,
    to_user_id: Option<Uuid>,
    book_title: String,
    book_author: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ExchangeRequestViewRow {
    id: Uuid,
    from_username: Option<String>,
    to_username: Option<String>,
    contact_email: Option<String>,
    book_title: String,
    book_author: String,
    created_at: DateTime<Utc>,
}

impl From<ExchangeRequestViewRow> for ExchangeRequestView {
    fn from(row: ExchangeRequestViewRow) -> Self {
        ExchangeRequestView {
            id: row.id,
            from_username: row.from_username,
            to_username: row.to_username,
            contact_email: row.contact_email,
            book_title: row.book_title,
            book_author: row.book_author,
            created_at: row.created_at,
        }
    }
}

impl ExchangeRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a request. Title and author are denormalized at creation time
    /// so the request survives later edits or deletion of the book.
    pub async fn create(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        book_title: &str,
        book_author: &str,
    ) -> Result<ExchangeRequest, AppError> {
        let row: ExchangeRequestDbRow = sqlx::query_as(
            r#"
            INSERT INTO exchange_requests (id, from_user_id, to_user_id, book_title, book_author)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, from_user_id, to_user_id, book_title, book_author, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(book_title)
        .bind(book_author)
        .fetch_one(&self.pool)
        .await?;

        Ok(ExchangeRequest {
            id: row.id,
            from_user_id: row.from_user_id,
            to_user_id: row.to_user_id,
            book_title: row.book_title,
            book_author: row.book_author,
            created_at: row.created_at,
        })
    }

    /// Whether `from_user` already requested this title/author from `to_user`.
    pub async fn exists(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        book_title: &str,
        book_author: &str,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM exchange_requests
                WHERE from_user_id = $1 AND to_user_id = $2
                  AND book_title = $3 AND book_author = $4
            )
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(book_title)
        .bind(book_author)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Recent requests the user sent, with the receiver's contact details.
    pub async fn recent_sent(&self, user_id: Uuid) -> Result<Vec<ExchangeRequestView>, AppError> {
        let rows: Vec<ExchangeRequestViewRow> = sqlx::query_as(
            r#"
            SELECT r.id,
                   fu.username AS from_username,
                   tu.username AS to_username,
                   tu.contact_email AS contact_email,
                   r.book_title, r.book_author, r.created_at
            FROM exchange_requests r
            JOIN users fu ON fu.id = r.from_user_id
            LEFT JOIN users tu ON tu.id = r.to_user_id
            WHERE r.from_user_id = $1
            ORDER BY r.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Recent requests the user received, with the sender's contact details.
    pub async fn recent_received(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ExchangeRequestView>, AppError> {
        let rows: Vec<ExchangeRequestViewRow> = sqlx::query_as(
            r#"
            SELECT r.id,
                   fu.username AS from_username,
                   tu.username AS to_username,
                   fu.contact_email AS contact_email,
                   r.book_title, r.book_author, r.created_at
            FROM exchange_requests r
            JOIN users fu ON fu.id = r.from_user_id
            LEFT JOIN users tu ON tu.id = r.to_user_id
            WHERE r.to_user_id = $1
            ORDER BY r.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
