//! Upload acceptance policy: size and content-type checks that run before any
//! pixel is decoded. Everything a client can get wrong here is one error
//! class, `InvalidImage`, except the size cap which maps to 413 upstream.

use crate::cover::InvalidImage;

/// Size/type gate for cover uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_bytes: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_content_types,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Strip MIME parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
    fn normalize_mime_type(content_type: &str) -> &str {
        content_type
            .split(';')
            .next()
            .map(|s| s.trim())
            .unwrap_or(content_type)
    }

    /// Check declared content type against the allow-list.
    pub fn check_content_type(&self, content_type: &str) -> Result<(), InvalidImage> {
        let normalized = Self::normalize_mime_type(content_type).to_lowercase();
        if !self
            .allowed_content_types
            .iter()
            .any(|ct| normalized == ct.to_lowercase())
        {
            return Err(InvalidImage(format!(
                "Unsupported content type '{}'. Allowed types: {}",
                content_type,
                self.allowed_content_types.join(", ")
            )));
        }
        Ok(())
    }

    /// Check the payload size. Returns the size for convenience.
    pub fn check_size(&self, len: usize) -> Result<usize, InvalidImage> {
        if len == 0 {
            return Err(InvalidImage("File is empty".to_string()));
        }
        if len > self.max_bytes {
            return Err(InvalidImage(format!(
                "File size {} bytes exceeds maximum of {} bytes",
                len, self.max_bytes
            )));
        }
        Ok(len)
    }
}
