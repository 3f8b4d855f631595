use chrono::{DateTime, Utc};
use giralibros_core::models::{AreaScope, OfferedBook, OfferedBookRow, VisibleBook};
use giralibros_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Repository for offered books and their attached covers.
#[derive(Clone)]
pub struct OfferedBookRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct OfferedBookDbRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    author: String,
    notes: String,
    reserved: bool,
    cover_key: Option<String>,
    cover_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OfferedBookDbRow> for OfferedBook {
    fn from(row: OfferedBookDbRow) -> Self {
        OfferedBook {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            author: row.author,
            notes: row.notes,
            reserved: row.reserved,
            cover_key: row.cover_key,
            cover_url: row.cover_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VisibleBookDbRow {
    id: Uuid,
    username: String,
    title: String,
    author: String,
    notes: String,
    reserved: bool,
    cover_url: Option<String>,
    created_at: DateTime<Utc>,
    already_requested: bool,
}

impl From<VisibleBookDbRow> for VisibleBook {
    fn from(row: VisibleBookDbRow) -> Self {
        VisibleBook {
            id: row.id,
            username: row.username,
            title: row.title,
            author: row.author,
            notes: row.notes,
            reserved: row.reserved,
            cover_url: row.cover_url,
            created_at: row.created_at,
            already_requested: row.already_requested,
        }
    }
}

const OFFERED_BOOK_COLUMNS: &str =
    "id, user_id, title, author, notes, reserved, cover_key, cover_url, created_at";

impl OfferedBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Browse offered books.
    ///
    /// `Filtered` scopes the listing to books whose owner shares one of the
    /// viewer's areas, excludes the viewer's own books, and flags books the
    /// viewer already requested. `Unfiltered` is the anonymous listing: every
    /// book, `already_requested` always false.
    pub async fn list_visible(
        &self,
        viewer: Option<Uuid>,
        scope: &AreaScope,
    ) -> Result<Vec<VisibleBook>, AppError> {
        let rows: Vec<VisibleBookDbRow> = match scope {
            AreaScope::Filtered(areas) => {
                let areas: Vec<String> = areas.iter().map(|a| a.as_str().to_string()).collect();
                sqlx::query_as(
                    r#"
                    SELECT b.id, u.username, b.title, b.author, b.notes, b.reserved,
                           b.cover_url, b.created_at,
                           EXISTS(
                               SELECT 1 FROM exchange_requests r
                               WHERE r.from_user_id = $1
                                 AND r.to_user_id = b.user_id
                                 AND r.book_title = b.title
                                 AND r.book_author = b.author
                           ) AS already_requested
                    FROM offered_books b
                    JOIN users u ON u.id = b.user_id
                    WHERE b.user_id <> $1
                      AND b.user_id IN (
                          SELECT ul.user_id FROM user_locations ul WHERE ul.area = ANY($2)
                      )
                    ORDER BY b.created_at DESC
                    "#,
                )
                .bind(viewer)
                .bind(&areas)
                .fetch_all(&self.pool)
                .await?
            }
            AreaScope::Unfiltered => {
                sqlx::query_as(
                    r#"
                    SELECT b.id, u.username, b.title, b.author, b.notes, b.reserved,
                           b.cover_url, b.created_at,
                           FALSE AS already_requested
                    FROM offered_books b
                    JOIN users u ON u.id = b.user_id
                    ORDER BY b.created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<OfferedBook>, AppError> {
        let rows: Vec<OfferedBookDbRow> = sqlx::query_as(&format!(
            "SELECT {} FROM offered_books WHERE user_id = $1 ORDER BY created_at",
            OFFERED_BOOK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<OfferedBook>, AppError> {
        let row: Option<OfferedBookDbRow> = sqlx::query_as(&format!(
            "SELECT {} FROM offered_books WHERE id = $1",
            OFFERED_BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<OfferedBook>, AppError> {
        let row: Option<OfferedBookDbRow> = sqlx::query_as(&format!(
            "SELECT {} FROM offered_books WHERE id = $1 AND user_id = $2",
            OFFERED_BOOK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        row: &OfferedBookRow,
    ) -> Result<OfferedBook, AppError> {
        let created: OfferedBookDbRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO offered_books (id, user_id, title, author, notes, reserved)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            OFFERED_BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&row.title)
        .bind(&row.author)
        .bind(&row.notes)
        .bind(row.reserved)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created.into())
    }

    /// Update an owned book's text fields. Cover columns are managed by
    /// [`set_cover`](Self::set_cover) only, so an edit without a new handle
    /// never touches the attached cover.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        user_id: Uuid,
        row: &OfferedBookRow,
    ) -> Result<OfferedBook, AppError> {
        let updated: Option<OfferedBookDbRow> = sqlx::query_as(&format!(
            r#"
            UPDATE offered_books
            SET title = $3, author = $4, notes = $5, reserved = $6
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            OFFERED_BOOK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&row.title)
        .bind(&row.author)
        .bind(&row.notes)
        .bind(row.reserved)
        .fetch_optional(&mut **tx)
        .await?;

        updated
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Offered book {} not found", id)))
    }

    /// Delete an owned book. Returns the cover key that was attached, if any,
    /// so the caller can drop the object.
    pub async fn delete_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Option<String>>, AppError> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "DELETE FROM offered_books WHERE id = $1 AND user_id = $2 RETURNING cover_key",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|(key,)| key))
    }

    /// Attach a cover to an owned book, returning the previous cover key so
    /// the caller can discard the replaced object.
    pub async fn set_cover(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        cover_key: &str,
        cover_url: &str,
    ) -> Result<Option<String>, AppError> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            WITH old AS (SELECT cover_key FROM offered_books WHERE id = $1)
            UPDATE offered_books
            SET cover_key = $3, cover_url = $4
            WHERE id = $1 AND user_id = $2
            RETURNING (SELECT cover_key FROM old)
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(cover_key)
        .bind(cover_url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((old_key,)) => Ok(old_key),
            None => Err(AppError::NotFound(format!(
                "Offered book {} not found",
                book_id
            ))),
        }
    }
}
