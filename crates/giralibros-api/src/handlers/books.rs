//! Offered-book browsing and the owner's bulk book form.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use giralibros_core::models::{
    AreaScope, OfferedBookResponse, OfferedBookRow, VisibleBook,
};
use giralibros_core::AppError;
use giralibros_db::with_transaction;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Browse offered books.
///
/// Authenticated callers see books from users sharing one of their exchange
/// areas, minus their own, each flagged with whether they already requested
/// it. Anonymous callers get the full listing with the flag always false.
#[utoipa::path(
    get,
    path = "/api/v0/books",
    tag = "books",
    responses(
        (status = 200, description = "Offered books visible to the caller", body = [VisibleBook])
    )
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    auth: MaybeAuthUser,
) -> Result<Json<Vec<VisibleBook>>, HttpAppError> {
    let books = match auth.0 {
        Some(user) => {
            let areas = state.users.areas(user.id).await?;
            state
                .books
                .list_visible(Some(user.id), &AreaScope::Filtered(areas))
                .await?
        }
        None => {
            state
                .books
                .list_visible(None, &AreaScope::Unfiltered)
                .await?
        }
    };

    Ok(Json(books))
}

/// The caller's own offered books, oldest first (form order).
#[utoipa::path(
    get,
    path = "/api/v0/my/books",
    tag = "books",
    responses(
        (status = 200, description = "The caller's offered books", body = [OfferedBookResponse])
    )
)]
pub async fn my_books(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<OfferedBookResponse>>, HttpAppError> {
    let books = state.books.list_for_owner(auth.0.id).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// Bulk save of the offered-books form: create, edit, and delete rows in one
/// submission. Each row may carry its own staged-cover handle.
///
/// The whole submission is validated before the broker is touched, so a
/// broken form never consumes or destroys a staged cover. After the rows are
/// saved, handles are claimed one by one; a handle that expired in the
/// meantime is logged and skipped, never surfaced as an error. Rows without
/// a handle keep whatever cover they already had.
#[utoipa::path(
    put,
    path = "/api/v0/my/books",
    tag = "books",
    responses(
        (status = 200, description = "Saved; returns the refreshed list", body = [OfferedBookResponse]),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 403, description = "A handle belongs to another user", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %auth.0.id, rows = rows.len()))]
pub async fn save_my_books(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(rows): ValidatedJson<Vec<OfferedBookRow>>,
) -> Result<Json<Vec<OfferedBookResponse>>, HttpAppError> {
    let user_id = auth.0.id;

    // Fail fast: every row must be valid and every referenced book owned by
    // the caller before any write or any broker call.
    for row in &rows {
        if !row.delete {
            row.validate().map_err(AppError::from)?;
        }
        if let Some(id) = row.id {
            state
                .books
                .get_owned(id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Offered book {} not found", id)))?;
        }
        if row.delete && row.id.is_none() {
            return Err(
                AppError::InvalidInput("Cannot delete a row without an id".to_string()).into(),
            );
        }
    }

    // Save the rows; collect cover keys of deleted books and the handle
    // attachments to perform after the commit.
    let books_repo = state.books.clone();
    let rows_for_tx = rows.clone();
    let (saved_with_handles, discarded_covers) =
        with_transaction(&state.pool, move |tx| {
            Box::pin(async move {
                let mut saved_with_handles: Vec<(Uuid, Option<Uuid>)> = Vec::new();
                let mut discarded_covers: Vec<String> = Vec::new();

                for row in &rows_for_tx {
                    match (row.id, row.delete) {
                        (Some(id), true) => {
                            if let Some(Some(cover_key)) =
                                books_repo.delete_tx(tx, id, user_id).await?
                            {
                                discarded_covers.push(cover_key);
                            }
                        }
                        (Some(id), false) => {
                            let book = books_repo.update_tx(tx, id, user_id, row).await?;
                            saved_with_handles.push((book.id, row.cover_handle));
                        }
                        (None, false) => {
                            let book = books_repo.insert_tx(tx, user_id, row).await?;
                            saved_with_handles.push((book.id, row.cover_handle));
                        }
                        (None, true) => {}
                    }
                }

                Ok((saved_with_handles, discarded_covers))
            })
        })
        .await?;

    // Rows are durable; now claim the staged covers. Soft misses are logged
    // inside the broker, ownership violations abort with 403.
    for (book_id, handle) in saved_with_handles {
        if let Some(handle) = handle {
            state.broker.attach_staged(book_id, user_id, handle).await?;
        }
    }

    for cover_key in discarded_covers {
        state.broker.discard_object(Some(&cover_key)).await;
    }

    let books = state.books.list_for_owner(user_id).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// Delete one offered book, discarding its cover object.
#[utoipa::path(
    delete,
    path = "/api/v0/my/books/{id}",
    tag = "books",
    params(("id" = Uuid, Path, description = "Offered book id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_my_book(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, HttpAppError> {
    let user = auth.0;

    let books_repo = state.books.clone();
    let cover_key = with_transaction(&state.pool, move |tx| {
        Box::pin(async move { books_repo.delete_tx(tx, id, user.id).await })
    })
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Offered book {} not found", id)))?;

    state.broker.discard_object(cover_key.as_deref()).await;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
