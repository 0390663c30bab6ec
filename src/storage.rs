//! File storage for uploaded images and documents.

use crate::content::slugify;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Public URL prefix under which [`DiskStorage`] files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` at `path` and return the public URL.
    async fn upload(&self, bytes: &[u8], path: &str, mime: &str) -> Result<String, StorageError>;

    /// Remove a previously uploaded file. Unknown URLs are ignored.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Stores files under a local directory.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Resolve a relative storage path, rejecting anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for DiskStorage {
    async fn upload(&self, bytes: &[u8], path: &str, _mime: &str) -> Result<String, StorageError> {
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        Ok(format!("{UPLOADS_URL_PREFIX}{path}"))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let Some(path) = url.strip_prefix(UPLOADS_URL_PREFIX) else {
            return Ok(());
        };
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Build a collision-resistant storage path: `<prefix>/<name>-<millis>-<random><.ext>`.
///
/// The extension is lowercased; the name is slugified from the original stem.
pub fn generate_filename(original: &str, prefix: &str) -> String {
    let original = Path::new(original);
    let ext = original
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "file".to_string());

    let stamp = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    let name = format!("{}-{}-{}{}", stem, stamp, &random[..8], ext);

    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== generate_filename Tests ====================

    #[test]
    fn test_generate_filename_shape() {
        let name = generate_filename("Spring Photo.JPG", "events");
        let pattern = regex::Regex::new(r"^events/spring-photo-\d+-[0-9a-f]{8}\.jpg$").unwrap();
        assert!(pattern.is_match(&name), "{name}");
    }

    #[test]
    fn test_generate_filename_without_extension_or_prefix() {
        let name = generate_filename("README", "");
        assert!(name.starts_with("readme-"));
        assert!(!name.contains('/'));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_generate_filename_unusable_stem() {
        let name = generate_filename("???.png", "news");
        assert!(name.starts_with("news/file-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_generate_filename_is_unique() {
        assert_ne!(
            generate_filename("a.jpg", "events"),
            generate_filename("a.jpg", "events")
        );
    }

    // ==================== DiskStorage Tests ====================

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path(), 1024);

        let url = storage
            .upload(b"jpeg bytes", "events/a.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "/uploads/events/a.jpg");
        let written = std::fs::read(dir.path().join("events/a.jpg")).unwrap();
        assert_eq!(written, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_files() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path(), 4);

        let result = storage.upload(b"too big", "a.jpg", "image/jpeg").await;
        assert!(matches!(result, Err(StorageError::TooLarge { limit: 4 })));
    }

    #[tokio::test]
    async fn test_upload_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path(), 1024);

        for path in ["../evil.jpg", "/etc/passwd", ""] {
            let result = storage.upload(b"x", path, "image/jpeg").await;
            assert!(matches!(result, Err(StorageError::InvalidPath(_))), "{path}");
        }
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path(), 1024);
        let url = storage.upload(b"x", "news/b.png", "image/png").await.unwrap();

        storage.delete(&url).await.unwrap();
        assert!(!dir.path().join("news/b.png").exists());
    }

    #[tokio::test]
    async fn test_delete_unknown_url_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path(), 1024);

        storage.delete("/uploads/missing.jpg").await.unwrap();
        storage.delete("https://cdn.example.com/x.jpg").await.unwrap();
    }
}
