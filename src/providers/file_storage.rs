use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::{AchievementError, InternalError};
use crate::types::internal::achievement::Attachment;

/// Largest accepted upload, 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Allow-listed extensions and the MIME type recorded for each
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
];

/// Public path under which stored files are served
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// Where attachment bytes end up
///
/// `store` receives an already validated, sanitised name and returns the URL
/// clients use to fetch the file.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, stored_name: &str, bytes: &[u8]) -> Result<String, InternalError>;
}

/// Writes uploads to a directory on the local filesystem
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, stored_name: &str, bytes: &[u8]) -> Result<String, InternalError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| InternalError::storage("create_upload_dir", e.to_string()))?;

        let path = self.root.join(stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| InternalError::storage("write_upload", e.to_string()))?;

        tracing::debug!("Stored upload at {}", path.display());

        Ok(format!("{}/{}", UPLOAD_URL_PREFIX, stored_name))
    }
}

/// Check extension and size of an upload and return its MIME type
pub fn validate_upload(file_name: &str, size: usize) -> Result<&'static str, AchievementError> {
    if size == 0 {
        return Err(AchievementError::validation("File is empty"));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AchievementError::validation("File size exceeds the 10MB limit"));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| AchievementError::validation("File has no extension"))?;

    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            AchievementError::validation("File type not allowed. Allowed: pdf, jpg, jpeg, png, doc, docx")
        })
}

/// Name under which an upload is stored: `<unix seconds>-<name>` with spaces as underscores
///
/// Directory components of the client-supplied name are dropped.
pub fn stored_file_name(file_name: &str, now: DateTime<Utc>) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    format!("{}-{}", now.timestamp(), base.replace(' ', "_"))
}

/// Validate, store and describe an upload as an attachment
pub async fn store_attachment(
    storage: &dyn FileStorage,
    file_name: &str,
    bytes: &[u8],
) -> Result<Attachment, InternalError> {
    let mime_type = validate_upload(file_name, bytes.len())?;
    let now = Utc::now();
    let stored_name = stored_file_name(file_name, now);
    let file_url = storage.store(&stored_name, bytes).await?;

    Ok(Attachment {
        file_name: stored_name,
        file_url,
        file_type: mime_type.to_string(),
        uploaded_at: now,
    })
}
