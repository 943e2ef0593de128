//! Local filesystem upload storage.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Maximum upload size (10 MB).
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Allowed image extensions for hero uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Upload failures. All variants are recoverable from the operator's
/// perspective; the caller surfaces them as validation errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("only JPG, JPEG, PNG, GIF, and WEBP files are allowed")]
    DisallowedType,

    #[error("file exceeds the maximum size of {} MB", MAX_UPLOAD_SIZE / (1024 * 1024))]
    TooLarge,

    #[error("file content does not look like an image")]
    NotAnImage,

    #[error("failed to store file")]
    Io(#[from] std::io::Error),
}

/// Storage backend contract for uploads.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Validate and persist an upload, returning its public reference path.
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, UploadError>;
}

/// Local filesystem implementation writing under a base directory.
pub struct LocalUploadStore {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalUploadStore {
    /// Create a new local upload store.
    pub fn new(base_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: base_url.into(),
        }
    }

    fn extension(original_name: &str) -> Option<String> {
        original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, UploadError> {
        let ext = Self::extension(original_name).ok_or(UploadError::DisallowedType)?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::DisallowedType);
        }

        if data.len() > MAX_UPLOAD_SIZE {
            return Err(UploadError::TooLarge);
        }

        // Sniff the content; the extension alone is operator input
        match infer::get(data) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {}
            _ => return Err(UploadError::NotAnImage),
        }

        let unique = Uuid::now_v7().simple().to_string();
        let filename = format!("post_{}.{ext}", &unique[..12]);
        let path = self.base_dir.join(&filename);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        debug!(path = ?path, size = data.len(), "upload stored");

        Ok(format!(
            "{}/{filename}",
            self.base_url.trim_end_matches('/')
        ))
    }
}

impl std::fmt::Debug for LocalUploadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalUploadStore")
            .field("base_dir", &self.base_dir)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Smallest valid PNG header bytes, enough for content sniffing.
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path(), "/uploads");

        let err = store.store("malware.exe", PNG_BYTES).await.unwrap_err();
        assert!(matches!(err, UploadError::DisallowedType));
    }

    #[tokio::test]
    async fn rejects_missing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path(), "/uploads");

        let err = store.store("noextension", PNG_BYTES).await.unwrap_err();
        assert!(matches!(err, UploadError::DisallowedType));
    }

    #[tokio::test]
    async fn rejects_non_image_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path(), "/uploads");

        let err = store.store("fake.png", b"not an image").await.unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));
    }

    #[tokio::test]
    async fn stores_valid_image_and_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path(), "/uploads/blog");

        let path = store.store("hero.PNG", PNG_BYTES).await.unwrap();
        assert!(path.starts_with("/uploads/blog/post_"));
        assert!(path.ends_with(".png"));

        let filename = path.rsplit('/').next().unwrap();
        assert!(dir.path().join(filename).exists());
    }

    #[tokio::test]
    async fn rejects_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path(), "/uploads");

        let mut data = PNG_BYTES.to_vec();
        data.resize(MAX_UPLOAD_SIZE + 1, 0);
        let err = store.store("big.png", &data).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge));
    }
}
