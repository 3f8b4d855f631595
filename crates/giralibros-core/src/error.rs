//! The unified error type.
//!
//! Every failure a handler can hit (database, storage, a bad upload, the
//! broker's not-found/forbidden outcomes) is an `AppError` variant. The
//! `ErrorMetadata` trait lets each variant describe its own HTTP presentation
//! without coupling this crate to any web framework.

use std::io;

use sqlx::Error as SqlxError;

/// How loudly an error should be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected, client-caused (validation failures and the like).
    Debug,
    /// Worth noticing but handled.
    Warn,
    /// Unexpected failure.
    Error,
}

/// How an error presents over HTTP.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable code, e.g. "INVALID_IMAGE".
    fn error_code(&self) -> &'static str;

    /// Whether a retry of the same request could succeed.
    fn is_recoverable(&self) -> bool;

    /// What the client is told; may say less than the internal message.
    fn client_message(&self) -> String;

    /// Whether details must be withheld in production responses.
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database failure: {0}")]
    Database(#[source] SqlxError),

    #[error("storage failure: {0}")]
    Storage(String),

    /// Bad upload input: oversized, disallowed type, or undecodable bytes.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The resource exists but belongs to a different caller. The client
    /// message stays generic so the response does not confirm existence.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal: {0}")]
    Internal(String),

    #[error("internal: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("io failure: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("malformed JSON: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("malformed UUID: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("validation failed: {}", err))
    }
}

/// Per-variant presentation, fixed at compile time. `client_message` stays a
/// method because some variants echo their dynamic content to the client.
struct ErrorProfile {
    status: u16,
    code: &'static str,
    recoverable: bool,
    sensitive: bool,
    level: LogLevel,
}

impl AppError {
    fn profile(&self) -> ErrorProfile {
        use LogLevel::*;
        let (status, code, recoverable, sensitive, level) = match self {
            AppError::Database(_) => (500, "DATABASE_ERROR", true, true, Error),
            AppError::Storage(_) => (500, "STORAGE_ERROR", true, true, Error),
            AppError::InvalidImage(_) => (400, "INVALID_IMAGE", false, false, Debug),
            AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, Debug),
            AppError::NotFound(_) => (404, "NOT_FOUND", false, false, Debug),
            AppError::Forbidden(_) => (403, "FORBIDDEN", false, false, Warn),
            AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, Debug),
            AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, false, Debug),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                (500, "INTERNAL_ERROR", true, true, Error)
            }
        };
        ErrorProfile {
            status,
            code,
            recoverable,
            sensitive,
            level,
        }
    }

    /// Variant name, for the detailed error body outside production.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidImage(_) => "InvalidImage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// The error plus its source chain, capped at a few hops.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut cause = self.source();
        for _ in 0..5 {
            match cause {
                Some(err) => {
                    details.push_str(&format!("\n  caused by: {}", err));
                    cause = err.source();
                }
                None => return details,
            }
        }
        if cause.is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            // Generic denial: never confirm what the handle points at.
            AppError::Forbidden(_) => "Access denied".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::InvalidImage(msg)
            | AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_invalid_image() {
        let err = AppError::InvalidImage("could not decode image".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_IMAGE");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "could not decode image");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_forbidden_message_is_generic() {
        let err = AppError::Forbidden("pending cover owned by another user".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.client_message(), "Access denied");
        assert!(!err.client_message().contains("pending"));
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Resource not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Resource not found");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("disk on fire");
        let err = AppError::InternalWithSource {
            message: "cover write failed".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("cover write failed"));
        assert!(details.contains("caused by: disk on fire"));
    }
}
