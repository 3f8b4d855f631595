//! Shared constants.

/// Prefix for all versioned API routes.
pub const API_PREFIX: &str = "/api/v0";

/// Content types accepted for cover uploads when `ALLOWED_CONTENT_TYPES` is unset.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

/// Upper bound on a single uploaded file, in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 5;

/// Normalized cover envelope. 400x600 is an exact 2:3 pair.
pub const DEFAULT_COVER_MAX_WIDTH: u32 = 400;
pub const DEFAULT_COVER_MAX_HEIGHT: u32 = 600;

/// JPEG quality factor for normalized covers.
pub const DEFAULT_COVER_JPEG_QUALITY: u8 = 85;

/// Age after which a staged cover is eligible for the sweep.
pub const DEFAULT_PENDING_TTL_HOURS: i64 = 24;
