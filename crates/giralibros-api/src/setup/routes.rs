//! Route configuration and setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use giralibros_core::constants;

use crate::api_doc::ApiDoc;
use crate::handlers::{books, covers, exchanges, health, maintenance, profile, wanted};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state)?;

    // Multipart framing adds overhead on top of the file itself.
    let body_limit = state.config.max_upload_bytes + 64 * 1024;
    let storage_path = state.config.storage_path.clone();

    let api = Router::new()
        .route("/covers", post(covers::upload_cover))
        .route("/books", get(books::list_books))
        .route(
            "/books/{id}/request-exchange",
            post(exchanges::request_exchange),
        )
        .route("/my/books", get(books::my_books).put(books::save_my_books))
        .route("/my/books/{id}", delete(books::delete_my_book))
        .route(
            "/my/wanted",
            get(wanted::my_wanted).put(wanted::save_my_wanted),
        )
        .route("/my/requests", get(exchanges::my_requests))
        .route(
            "/my/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/maintenance/sweep-pending",
            post(maintenance::sweep_pending),
        );

    let app = Router::new()
        .route("/health", get(health::health))
        .nest(constants::API_PREFIX, api)
        .with_state(state);

    let app = app
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .nest_service("/media", ServeDir::new(storage_path))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit));

    Ok(app)
}

fn setup_cors(state: &AppState) -> Result<CorsLayer, anyhow::Error> {
    let origins = &state.config.cors_origins;

    if origins.iter().any(|o| o.trim() == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let parsed: Result<Vec<HeaderValue>, _> = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect();
    let parsed = parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any))
}
