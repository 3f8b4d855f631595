//! Connection pool and startup migrations.

use anyhow::{Context, Result};
use giralibros_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

/// Open the Postgres pool and bring the schema up to date.
pub async fn connect_and_migrate(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Postgres connection failed")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Postgres pool ready"
    );

    // migrations/ sits at the workspace root, two levels up from this crate.
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    sqlx::migrate::Migrator::new(dir)
        .await
        .context("migration directory unreadable")?
        .run(&pool)
        .await
        .context("schema migration failed")?;
    tracing::info!("Schema up to date");

    Ok(pool)
}
