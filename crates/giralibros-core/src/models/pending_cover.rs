use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A normalized cover staged before its book row exists.
///
/// The row id doubles as the opaque handle handed to the client. A pending
/// cover is either consumed (moved onto a book, row deleted) or expired
/// (deleted by the sweep); there is no way back from either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCover {
    pub id: Uuid,
    pub user_id: Uuid,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

/// Response for an upload that was staged for a later form submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct StagedCoverResponse {
    /// Opaque handle to carry through the form submission.
    pub handle: Uuid,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Response for an upload attached directly to an existing book.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttachedCoverResponse {
    pub book_id: Uuid,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of expired pending covers removed.
    pub removed: u64,
}
