//! Application initialization: database, storage, state, and routes.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use giralibros_core::Config;
use giralibros_storage::{LocalStorage, Storage};

use crate::state::AppState;

/// Build the application: connect, migrate, wire the state, build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = database::connect_and_migrate(&config).await?;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.storage_path.clone(), config.storage_base_url.clone()).await?,
    );

    let state = Arc::new(AppState::new(config, pool, storage));
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
