//! Bearer-token authentication extractors.
//!
//! Tokens are looked up in `users.api_token`; the authenticated user becomes
//! the owner of anything they stage. Session and registration flows live
//! outside this service.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use giralibros_core::{models::User, AppError};
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;
use crate::state::AppState;

/// An authenticated caller. Rejects the request with 401 when the header is
/// missing, malformed, or the token is unknown.
pub struct AuthUser(pub User);

/// Optional authentication: `None` when no Authorization header is present,
/// 401 when one is present but wrong. Used by the public browse route.
pub struct MaybeAuthUser(pub Option<User>);

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let header = match parts.headers.get("Authorization") {
        Some(value) => value,
        None => return Ok(None),
    };
    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization must be a bearer token".to_string()))?;
    Ok(Some(token.to_string()))
}

async fn lookup(state: &Arc<AppState>, token: &str) -> Result<User, AppError> {
    state
        .users
        .find_by_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid API token".to_string()))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;
        let user = lookup(state, &token).await?;
        Ok(AuthUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => {
                let user = lookup(state, &token).await?;
                Ok(MaybeAuthUser(Some(user)))
            }
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verify the operator key for maintenance endpoints.
pub fn verify_maintenance_key(state: &AppState, parts: &Parts) -> Result<(), AppError> {
    let configured = state
        .config
        .maintenance_key
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Maintenance key not configured".to_string()))?;

    let provided = parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    if !secure_compare(provided, configured) {
        return Err(AppError::Unauthorized("Invalid maintenance key".to_string()));
    }

    Ok(())
}

/// Extractor wrapper for operator-only routes.
pub struct MaintenanceAuth;

impl FromRequestParts<Arc<AppState>> for MaintenanceAuth {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_maintenance_key(state, parts)?;
        Ok(MaintenanceAuth)
    }
}
