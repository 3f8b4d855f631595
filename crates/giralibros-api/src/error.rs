//! HTTP rendering for domain errors.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! (`AppError`, `StorageError`, the normalizer's `InvalidImage`) convert into
//! `HttpAppError`, so every failure renders the same JSON body with the right
//! status and gets logged at the variant's level.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use giralibros_core::{AppError, ErrorMetadata, LogLevel};
use giralibros_processing::InvalidImage;
use giralibros_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable code for programmatic handling.
    pub code: String,
    /// Whether retrying the request could succeed.
    pub recoverable: bool,
}

/// Newtype over `AppError` (orphan rules: `IntoResponse` and `AppError` both
/// live elsewhere).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<InvalidImage> for HttpAppError {
    fn from(err: InvalidImage) -> Self {
        HttpAppError(AppError::InvalidImage(err.to_string()))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app(err))
    }
}

/// Fold storage failures into the unified error type. A missing object is a
/// plain `NotFound`; a rejected key means someone fed us a bad one (a bug, as
/// keys are server-generated); everything else is a 500.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(key),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::Io(err) => AppError::Internal(format!("io failure: {}", err)),
        StorageError::Config(msg) => AppError::Internal(msg),
        other => AppError::Storage(other.to_string()),
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor whose rejection is our `ErrorResponse` (400 + JSON)
/// instead of axum's plain-text default.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn details_hidden() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| matches!(env.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = &self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, error_type = err.error_type(), "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, error_type = err.error_type(), "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, error_type = err.error_type(), "Request failed"),
        }

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Production hides every detail; elsewhere only sensitive ones.
        let expose = !details_hidden() && !err.is_sensitive();
        let body = ErrorResponse {
            error: err.client_message(),
            details: expose.then(|| err.detailed_message()),
            error_type: expose.then(|| err.error_type().to_string()),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("covers/x.jpg".to_string()).into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "covers/x.jpg"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("bad key".to_string()).into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "bad key"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_from_invalid_image() {
        let HttpAppError(app_err) = InvalidImage("bad pixels".to_string()).into();
        match app_err {
            AppError::InvalidImage(msg) => assert_eq!(msg, "bad pixels"),
            _ => panic!("Expected InvalidImage variant"),
        }
    }

    /// Serialized ErrorResponse always carries "error", "code", "recoverable".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
            error_type: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert!(json.get("details").is_none());
    }
}
