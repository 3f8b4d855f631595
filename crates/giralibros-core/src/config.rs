//! Configuration module
//!
//! Env-driven configuration for the API server: database, storage, upload
//! limits, cover normalization parameters, and the pending-cover sweep age.

use std::env;

use crate::constants;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Key for operator-only maintenance endpoints (the pending-cover sweep).
    pub maintenance_key: Option<String>,
    // Storage configuration
    pub storage_path: String,
    pub storage_base_url: String,
    // Upload limits
    pub max_upload_bytes: usize,
    pub allowed_content_types: Vec<String>,
    // Cover normalization parameters
    pub cover_max_width: u32,
    pub cover_max_height: u32,
    pub cover_jpeg_quality: u8,
    /// Default age threshold for the pending-cover sweep, in hours.
    pub pending_ttl_hours: i64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| constants::DEFAULT_MAX_UPLOAD_MB.to_string())
            .parse::<usize>()
            .unwrap_or(constants::DEFAULT_MAX_UPLOAD_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| constants::DEFAULT_ALLOWED_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            maintenance_key: env::var("MAINTENANCE_KEY").ok(),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./media".to_string()),
            storage_base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/media".to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            allowed_content_types,
            cover_max_width: env::var("COVER_MAX_WIDTH")
                .unwrap_or_else(|_| constants::DEFAULT_COVER_MAX_WIDTH.to_string())
                .parse()
                .unwrap_or(constants::DEFAULT_COVER_MAX_WIDTH),
            cover_max_height: env::var("COVER_MAX_HEIGHT")
                .unwrap_or_else(|_| constants::DEFAULT_COVER_MAX_HEIGHT.to_string())
                .parse()
                .unwrap_or(constants::DEFAULT_COVER_MAX_HEIGHT),
            cover_jpeg_quality: env::var("COVER_JPEG_QUALITY")
                .unwrap_or_else(|_| constants::DEFAULT_COVER_JPEG_QUALITY.to_string())
                .parse()
                .unwrap_or(constants::DEFAULT_COVER_JPEG_QUALITY),
            pending_ttl_hours: env::var("PENDING_TTL_HOURS")
                .unwrap_or_else(|_| constants::DEFAULT_PENDING_TTL_HOURS.to_string())
                .parse()
                .unwrap_or(constants::DEFAULT_PENDING_TTL_HOURS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.is_production() && self.maintenance_key.is_none() {
            return Err(anyhow::anyhow!(
                "MAINTENANCE_KEY must be set in production for the sweep endpoint"
            ));
        }
        if self.cover_max_width * 3 != self.cover_max_height * 2 {
            return Err(anyhow::anyhow!(
                "COVER_MAX_WIDTH:COVER_MAX_HEIGHT must be an exact 2:3 pair (got {}x{})",
                self.cover_max_width,
                self.cover_max_height
            ));
        }
        if self.cover_jpeg_quality == 0 || self.cover_jpeg_quality > 100 {
            return Err(anyhow::anyhow!("COVER_JPEG_QUALITY must be in 1..=100"));
        }
        Ok(())
    }
}
