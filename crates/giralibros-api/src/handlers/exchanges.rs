//! Exchange requests.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use giralibros_core::models::{ExchangeRequest, ExchangeRequestsResponse};
use giralibros_core::AppError;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Request an exchange for someone else's offered book.
///
/// Title and author are denormalized into the request so it survives later
/// changes to the book. Requesting the same book twice is rejected.
#[utoipa::path(
    post,
    path = "/api/v0/books/{id}/request-exchange",
    tag = "exchanges",
    params(("id" = Uuid, Path, description = "Offered book id")),
    responses(
        (status = 201, description = "Exchange request created"),
        (status = 400, description = "Own book or duplicate request", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %auth.0.id, book_id = %id))]
pub async fn request_exchange(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ExchangeRequest>), HttpAppError> {
    let user = auth.0;

    let book = state
        .books
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offered book {} not found", id)))?;

    if book.user_id == user.id {
        return Err(
            AppError::InvalidInput("Cannot request an exchange for your own book".to_string())
                .into(),
        );
    }

    if state
        .exchanges
        .exists(user.id, book.user_id, &book.title, &book.author)
        .await?
    {
        return Err(AppError::InvalidInput("Already requested".to_string()).into());
    }

    let request = state
        .exchanges
        .create(user.id, book.user_id, &book.title, &book.author)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// Recent requests the caller sent and received, with contact details.
#[utoipa::path(
    get,
    path = "/api/v0/my/requests",
    tag = "exchanges",
    responses(
        (status = 200, description = "Recent sent and received requests", body = ExchangeRequestsResponse)
    )
)]
pub async fn my_requests(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ExchangeRequestsResponse>, HttpAppError> {
    let sent = state.exchanges.recent_sent(auth.0.id).await?;
    let received = state.exchanges.recent_received(auth.0.id).await?;

    Ok(Json(ExchangeRequestsResponse { sent, received }))
}
