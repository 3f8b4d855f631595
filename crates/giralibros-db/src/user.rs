use std::str::FromStr;

use chrono::{DateTime, Utc};
use giralibros_core::models::{LocationArea, ProfileForm, User};
use giralibros_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::with_transaction;

/// Repository for users and their exchange areas.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserDbRow {
    id: Uuid,
    username: String,
    contact_email: String,
    alternate_contact: String,
    about: String,
    created_at: DateTime<Utc>,
}

impl From<UserDbRow> for User {
    fn from(row: UserDbRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            contact_email: row.contact_email,
            alternate_contact: row.alternate_contact,
            about: row.about,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, contact_email, alternate_contact, about, created_at";

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a bearer token to its user. `None` for unknown tokens.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserDbRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE api_token = $1",
            USER_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row: Option<UserDbRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// The user's exchange areas, ordered by name for stable output.
    pub async fn areas(&self, user_id: Uuid) -> Result<Vec<LocationArea>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT area FROM user_locations WHERE user_id = $1 ORDER BY area")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(area,)| {
                LocationArea::from_str(&area)
                    .map_err(|e| AppError::Internal(format!("corrupt user_locations row: {}", e)))
            })
            .collect()
    }

    /// Update contact fields and replace the user's areas with the submitted
    /// set, all in one transaction.
    pub async fn update_profile(&self, user_id: Uuid, form: &ProfileForm) -> Result<(), AppError> {
        let form = form.clone();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET contact_email = $2, alternate_contact = $3, about = $4
                    WHERE id = $1
                    "#,
                )
                .bind(user_id)
                .bind(&form.contact_email)
                .bind(&form.alternate_contact)
                .bind(&form.about)
                .execute(&mut **tx)
                .await?;

                sqlx::query("DELETE FROM user_locations WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;

                for area in &form.areas {
                    sqlx::query(
                        "INSERT INTO user_locations (user_id, area) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                    )
                    .bind(user_id)
                    .bind(area.as_str())
                    .execute(&mut **tx)
                    .await?;
                }

                Ok(())
            })
        })
        .await
    }
}
