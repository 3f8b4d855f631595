pub mod books;
pub mod covers;
pub mod exchanges;
pub mod health;
pub mod maintenance;
pub mod profile;
pub mod wanted;

use axum::extract::Multipart;
use giralibros_core::AppError;
use giralibros_processing::UploadPolicy;

/// Pull the single "file" part out of a multipart body.
///
/// Exactly one part named "file" is expected; a second one is rejected, other
/// parts are ignored. Returns the bytes and the part's declared content type.
pub(crate) async fn extract_multipart_file(
    mut multipart: Multipart,
) -> Result<(Vec<u8>, String), AppError> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("multipart body unreadable: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "send exactly one part named 'file'".to_string(),
            ));
        }

        let declared_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("file part unreadable: {}", e)))?;

        upload = Some((data.to_vec(), declared_type));
    }

    upload.ok_or_else(|| AppError::InvalidInput("missing 'file' part".to_string()))
}

/// Gate an upload before decoding: reject empty payloads, payloads over the
/// size cap (413), and disallowed content types. No storage writes happen
/// before this passes.
pub(crate) fn validate_upload(
    policy: &UploadPolicy,
    len: usize,
    content_type: &str,
) -> Result<(), AppError> {
    if len > policy.max_bytes() {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            policy.max_bytes() / 1024 / 1024
        )));
    }
    policy
        .check_size(len)
        .and_then(|_| policy.check_content_type(content_type))
        .map_err(|e| AppError::InvalidImage(e.to_string()))?;
    Ok(())
}
