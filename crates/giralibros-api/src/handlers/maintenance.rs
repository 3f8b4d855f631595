//! Operator maintenance endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Duration;
use giralibros_core::models::SweepResponse;
use serde::Deserialize;

use crate::auth::MaintenanceAuth;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SweepQuery {
    /// Age threshold in hours; defaults to the configured TTL.
    pub max_age_hours: Option<i64>,
}

/// Delete staged covers older than the threshold, rows and objects both.
///
/// Idempotent; meant to run on a recurring schedule outside the
/// request/response path. Requires the operator maintenance key.
#[utoipa::path(
    post,
    path = "/api/v0/maintenance/sweep-pending",
    tag = "maintenance",
    params(
        ("max_age_hours" = Option<i64>, Query, description = "Age threshold in hours (default: configured TTL)")
    ),
    responses(
        (status = 200, description = "Sweep finished", body = SweepResponse),
        (status = 401, description = "Missing or invalid maintenance key", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn sweep_pending(
    State(state): State<Arc<AppState>>,
    _auth: MaintenanceAuth,
    Query(query): Query<SweepQuery>,
) -> Result<Json<SweepResponse>, HttpAppError> {
    let hours = query
        .max_age_hours
        .unwrap_or(state.config.pending_ttl_hours)
        .max(0);

    let removed = state.broker.sweep(Duration::hours(hours)).await?;

    Ok(Json(SweepResponse { removed }))
}
