//! The caller's wanted-books list.

use std::sync::Arc;

use axum::{extract::State, Json};
use giralibros_core::models::{WantedBookResponse, WantedBookRow};
use giralibros_core::AppError;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/my/wanted",
    tag = "books",
    responses(
        (status = 200, description = "The caller's wanted books", body = [WantedBookResponse])
    )
)]
pub async fn my_wanted(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<WantedBookResponse>>, HttpAppError> {
    let books = state.wanted.list(auth.0.id).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// Replace the wanted list with the submitted rows.
#[utoipa::path(
    put,
    path = "/api/v0/my/wanted",
    tag = "books",
    responses(
        (status = 200, description = "Saved; returns the refreshed list", body = [WantedBookResponse]),
        (status = 400, description = "Invalid submission", body = ErrorResponse)
    )
)]
pub async fn save_my_wanted(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(rows): ValidatedJson<Vec<WantedBookRow>>,
) -> Result<Json<Vec<WantedBookResponse>>, HttpAppError> {
    for row in &rows {
        row.validate().map_err(AppError::from)?;
    }

    state.wanted.replace_all(auth.0.id, &rows).await?;

    let books = state.wanted.list(auth.0.id).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}
