//! The caller's profile: contact fields and exchange areas.

use std::sync::Arc;

use axum::{extract::State, Json};
use giralibros_core::models::{ProfileForm, ProfileResponse};
use giralibros_core::AppError;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/my/profile",
    tag = "profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, HttpAppError> {
    let user = auth.0;
    let areas = state.users.areas(user.id).await?;

    Ok(Json(ProfileResponse {
        username: user.username,
        contact_email: user.contact_email,
        alternate_contact: user.alternate_contact,
        about: user.about,
        areas,
    }))
}

/// Update contact fields and replace the exchange areas with the submitted
/// set. Areas affect which offered books the user sees when browsing.
#[utoipa::path(
    put,
    path = "/api/v0/my/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(form): ValidatedJson<ProfileForm>,
) -> Result<Json<ProfileResponse>, HttpAppError> {
    form.validate().map_err(AppError::from)?;

    state.users.update_profile(auth.0.id, &form).await?;

    let user = state
        .users
        .get(auth.0.id)
        .await?
        .ok_or_else(|| AppError::Internal("authenticated user vanished".to_string()))?;
    let areas = state.users.areas(user.id).await?;

    Ok(Json(ProfileResponse {
        username: user.username,
        contact_email: user.contact_email,
        alternate_contact: user.alternate_contact,
        about: user.about,
        areas,
    }))
}
