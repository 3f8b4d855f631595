use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An exchange request from one user to another.
///
/// Book title and author are denormalized so the request survives edits or
/// deletion of the offered book it was sent for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    /// Nullable: the receiving account may have been deleted.
    pub to_user_id: Option<Uuid>,
    pub book_title: String,
    pub book_author: String,
    pub created_at: DateTime<Utc>,
}

/// An exchange request as listed for its sender or receiver, with usernames
/// and contact details resolved.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeRequestView {
    pub id: Uuid,
    pub from_username: Option<String>,
    pub to_username: Option<String>,
    pub contact_email: Option<String>,
    pub book_title: String,
    pub book_author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeRequestsResponse {
    pub sent: Vec<ExchangeRequestView>,
    pub received: Vec<ExchangeRequestView>,
}
