//! Cover upload endpoint.
//!
//! One multipart endpoint serves both entry points: with `?book={id}` the
//! normalized cover attaches directly to an owned book; without, it is staged
//! and the caller gets back an opaque handle to carry through the form.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use giralibros_core::models::{AttachedCoverResponse, StagedCoverResponse};
use giralibros_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{extract_multipart_file, validate_upload};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// When present, attach to this (owned) book instead of staging.
    pub book: Option<Uuid>,
}

/// Upload a cover photograph.
///
/// The image is validated, normalized (upright, opaque, exact 2:3, within the
/// envelope, JPEG), and then either attached to the given book or staged for
/// a later submission. Validation failures write nothing.
#[utoipa::path(
    post,
    path = "/api/v0/covers",
    tag = "covers",
    params(
        ("book" = Option<Uuid>, Query, description = "Attach directly to this owned book")
    ),
    responses(
        (status = 200, description = "Cover attached to the book", body = AttachedCoverResponse),
        (status = 201, description = "Cover staged for a later submission", body = StagedCoverResponse),
        (status = 400, description = "Invalid image", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %auth.0.id, book = ?query.book))]
pub async fn upload_cover(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let user = auth.0;

    let (data, content_type) = extract_multipart_file(multipart).await?;
    validate_upload(&state.policy, data.len(), &content_type)?;

    // Resolve the target book before doing any work on the pixels.
    let book = match query.book {
        Some(book_id) => Some(
            state
                .books
                .get_owned(book_id, user.id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Offered book {} not found", book_id)))?,
        ),
        None => None,
    };

    // Normalization is CPU-bound; keep it off the async workers.
    let normalizer = state.normalizer.clone();
    let cover = tokio::task::spawn_blocking(move || normalizer.normalize(&data))
        .await
        .map_err(|e| AppError::Internal(format!("normalization task failed: {}", e)))?
        .map_err(|e| AppError::InvalidImage(e.to_string()))?;

    match book {
        Some(book) => {
            let url = state.broker.attach_normalized(book.id, user.id, &cover).await?;
            Ok(Json(AttachedCoverResponse {
                book_id: book.id,
                url,
                width: cover.width,
                height: cover.height,
            })
            .into_response())
        }
        None => {
            let (pending, url) = state.broker.stage(user.id, &cover).await?;
            Ok((
                StatusCode::CREATED,
                Json(StagedCoverResponse {
                    handle: pending.id,
                    url,
                    width: cover.width,
                    height: cover.height,
                }),
            )
                .into_response())
        }
    }
}
