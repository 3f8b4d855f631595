use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A book a user offers for exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedBook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    pub notes: String,
    /// Marks a book reserved for a not yet fulfilled exchange.
    pub reserved: bool,
    pub cover_key: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An offered book as seen while browsing: includes the offering user and
/// whether the viewer already sent an exchange request for it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisibleBook {
    pub id: Uuid,
    pub username: String,
    pub title: String,
    pub author: String,
    pub notes: String,
    pub reserved: bool,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Always false for anonymous viewers.
    pub already_requested: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OfferedBookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub notes: String,
    pub reserved: bool,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OfferedBook> for OfferedBookResponse {
    fn from(book: OfferedBook) -> Self {
        OfferedBookResponse {
            id: book.id,
            title: book.title,
            author: book.author,
            notes: book.notes,
            reserved: book.reserved,
            cover_url: book.cover_url,
            created_at: book.created_at,
        }
    }
}

/// One row of the bulk offered-books form. Each row carries its own optional
/// cover handle; removing a row never renumbers another row's handle.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct OfferedBookRow {
    /// Present for edits, absent for new books.
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "author must be 1-200 characters"))]
    pub author: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub reserved: bool,
    /// Handle of a staged cover to attach on save.
    #[serde(default)]
    pub cover_handle: Option<Uuid>,
    /// Marks this row for deletion.
    #[serde(default)]
    pub delete: bool,
}

/// A book a user is interested in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedBook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WantedBookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl From<WantedBook> for WantedBookResponse {
    fn from(book: WantedBook) -> Self {
        WantedBookResponse {
            id: book.id,
            title: book.title,
            author: book.author,
            created_at: book.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct WantedBookRow {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "author must be 1-200 characters"))]
    pub author: String,
}
