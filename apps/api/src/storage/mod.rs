//! Object storage for uploaded resume files.
//!
//! One `ObjectStore` trait, two backends selected by configuration:
//! `LocalStore` (files under an upload directory) and `S3Store` (bucket +
//! presigned URLs). Upload validation lives here so that no backend is ever
//! asked to write a file that fails the type or size checks.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod local;
pub mod s3;

pub use local::LocalStore;
pub use s3::S3Store;

/// 5 MB, matching the upload limit the frontend advertises.
pub const MAX_UPLOAD_BYTES: usize = 5_000_000;

/// Lifetime of the URL handed to the AI service for remote objects.
pub const PROCESSING_URL_TTL: Duration = Duration::from_secs(300);

const PDF_MIME: &str = "application/pdf";
const DOC_MIME: &str = "application/msword";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file type")]
    InvalidFileType,

    #[error("file exceeds {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A file received from the client, not yet validated.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Multipart field the file arrived under; used as the key prefix.
    pub field_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Where a successfully written object lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Local path or bucket URL.
    pub reference: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Reference the AI service can read the object through: the path itself for
    /// local storage, a signed URL valid for `ttl` for remote storage.
    async fn processing_reference(
        &self,
        object: &StoredObject,
        ttl: Duration,
    ) -> Result<String, StorageError>;
}

/// Checks the allow-list: the extension and the declared MIME type must both be
/// resume types and must agree with each other.
pub fn validate_upload(original_name: &str, mime_type: &str, size: usize) -> Result<(), StorageError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(StorageError::FileTooLarge {
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let extension = extension_of(original_name).ok_or(StorageError::InvalidFileType)?;
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let agrees = match extension.as_str() {
        "pdf" => mime == PDF_MIME,
        "doc" | "docx" => mime == DOC_MIME || mime == DOCX_MIME,
        _ => false,
    };

    if agrees {
        Ok(())
    } else {
        Err(StorageError::InvalidFileType)
    }
}

/// Validates an upload, derives its key and writes it. Nothing is written when
/// validation fails.
pub async fn store_upload(
    store: &dyn ObjectStore,
    upload: &Upload,
) -> Result<StoredObject, StorageError> {
    validate_upload(&upload.original_name, &upload.mime_type, upload.bytes.len())?;

    let key = object_key(
        &upload.field_name,
        &upload.original_name,
        chrono::Utc::now().timestamp_millis(),
    );
    store
        .put(&key, upload.bytes.clone(), &upload.mime_type)
        .await
}

/// `<field>-<millis>.<ext>`, e.g. `resume-1712345678901.pdf`.
pub fn object_key(field_name: &str, original_name: &str, millis: i64) -> String {
    match extension_of(original_name) {
        Some(ext) => format!("{field_name}-{millis}.{ext}"),
        None => format!("{field_name}-{millis}"),
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
