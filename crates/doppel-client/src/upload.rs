//! Validated photo uploads and their prediction identity

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Upload validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported image extension in '{0}' (accepted: jpg, jpeg, png)")]
    UnsupportedExtension(String),

    #[error("unsupported content type '{0}' (accepted: image/jpeg, image/png)")]
    UnsupportedContentType(String),

    #[error("uploaded file '{0}' is empty")]
    EmptyFile(String),
}

/// A user-uploaded photo held in memory.
///
/// The bytes are owned, so every transmission reads the full content
/// from offset zero - there is no shared read cursor to reset between
/// the thumbnail render and the multipart submission.
///
/// Identity for memoization is the content fingerprint, not the file
/// name: re-uploading identical bytes under a new name hits the cached
/// prediction, while a different photo with the same name does not.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
    fingerprint: u64,
}

impl UploadedImage {
    /// Validate and wrap an upload. JPEG and PNG only; both the file
    /// extension and the declared MIME type are checked.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();

        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedExtension(file_name));
        }
        if !ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(UploadError::UnsupportedContentType(mime_type));
        }
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile(file_name));
        }

        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        let fingerprint = hasher.finish();

        debug!(
            "accepted upload '{}' ({} bytes, fingerprint {:016x})",
            file_name,
            bytes.len(),
            fingerprint
        );
        Ok(Self {
            file_name,
            mime_type,
            bytes,
            fingerprint,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared MIME type, forwarded on the multipart part.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content hash forming the prediction identity together with the
    /// selected model.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}
