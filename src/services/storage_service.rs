// src/services/storage_service.rs
//! Local object store for uploaded profile images, served under `/uploads`.
use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "/uploads/";

const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[("image/png", "png"), ("image/jpeg", "jpg"), ("image/jpg", "jpg")];

/// Leading bytes every file of the given extension must start with.
const SIGNATURES: &[(&str, &[u8])] = &[("png", b"\x89PNG"), ("jpg", b"\xFF\xD8\xFF")];

#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl AvatarStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks type and size before anything touches the disk. Returns the file extension.
    pub fn validate(&self, content_type: Option<&str>, len: usize) -> AppResult<&'static str> {
        let ext = content_type
            .and_then(|ct| ALLOWED_IMAGE_TYPES.iter().find(|(t, _)| t.eq_ignore_ascii_case(ct)))
            .map(|(_, ext)| *ext)
            .ok_or_else(|| AppError::Validation("Only PNG and JPEG files are allowed.".into()))?;
        if len == 0 {
            return Err(AppError::Validation("The uploaded file is empty.".into()));
        }
        if len > self.max_bytes {
            return Err(AppError::Validation(format!(
                "File size must not exceed {}KB.",
                self.max_bytes / 1024
            )));
        }
        Ok(ext)
    }

    /// Writes the image once and returns its public URL. No retry on failure.
    pub async fn store_avatar(&self, user_id: &str, content_type: Option<&str>, bytes: &[u8]) -> AppResult<String> {
        let ext = self.validate(content_type, bytes.len())?;
        // The declared type comes from the client; the body has to agree with it.
        if !has_signature(ext, bytes) {
            tracing::warn!("Upload from {} claims {:?} but is not a {} file.", user_id, content_type, ext);
            return Err(AppError::Validation("Only PNG and JPEG files are allowed.".into()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}-{}.{}", sanitize(user_id), Uuid::new_v4().simple(), ext);
        let path = self.dir.join(&file_name);
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::info!("🖼️ Stored profile image {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{PUBLIC_PREFIX}{file_name}"))
    }

    /// Removes a file previously returned by `store_avatar`.
    /// URLs that do not point into this store are left alone.
    pub async fn remove(&self, public_url: &str) -> AppResult<()> {
        let Some(file_name) = public_url.strip_prefix(PUBLIC_PREFIX) else {
            tracing::debug!("Not a stored upload, nothing to remove: {}", public_url);
            return Ok(());
        };
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
            return Err(AppError::Validation(format!("Refusing to remove '{public_url}'.")));
        }
        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {
                tracing::info!("🗑️ Removed stored upload {}", file_name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn has_signature(ext: &str, bytes: &[u8]) -> bool {
    SIGNATURES
        .iter()
        .find(|(e, _)| *e == ext)
        .is_some_and(|(_, magic)| bytes.starts_with(magic))
}

fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect()
}

#[cfg(test)]
pub(crate) fn temp_store() -> AvatarStore {
    let dir = std::env::temp_dir().join(format!("alumni-portal-test-{}", Uuid::new_v4().simple()));
    AvatarStore::new(dir, 500 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_type_and_oversized_files() {
        let store = AvatarStore::new("/tmp/unused", 1024);
        assert!(matches!(store.validate(Some("image/gif"), 10), Err(AppError::Validation(_))));
        assert!(matches!(store.validate(None, 10), Err(AppError::Validation(_))));
        assert!(matches!(store.validate(Some("image/png"), 1025), Err(AppError::Validation(_))));
        assert_eq!(store.validate(Some("image/jpeg"), 1024).unwrap(), "jpg");
    }

    #[tokio::test]
    async fn stores_and_removes_an_avatar() {
        let store = temp_store();
        let url = store.store_avatar("user-1", Some("image/png"), b"\x89PNG fake").await.unwrap();
        assert!(url.starts_with("/uploads/user-1-"));
        assert!(url.ends_with(".png"));

        let file_name = url.strip_prefix(PUBLIC_PREFIX).unwrap();
        assert!(store.dir().join(file_name).exists());

        store.remove(&url).await.unwrap();
        assert!(!store.dir().join(file_name).exists());
        // Second removal is a no-op.
        store.remove(&url).await.unwrap();

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn body_must_match_the_declared_type() {
        let store = temp_store();
        let renamed_gif = store.store_avatar("user-1", Some("image/png"), b"GIF89a....").await;
        assert!(matches!(renamed_gif, Err(AppError::Validation(_))));
        let png_as_jpeg = store.store_avatar("user-1", Some("image/jpeg"), b"\x89PNG\r\n").await;
        assert!(matches!(png_as_jpeg, Err(AppError::Validation(_))));
        // Nothing was written for the rejected uploads.
        assert!(!store.dir().exists() || std::fs::read_dir(store.dir()).unwrap().next().is_none());

        let url = store.store_avatar("user-1", Some("image/jpeg"), b"\xFF\xD8\xFF\xE0 jfif").await.unwrap();
        assert!(url.ends_with(".jpg"));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn remove_ignores_external_urls_and_rejects_traversal() {
        let store = temp_store();
        store.remove("https://images.example.com/a.png").await.unwrap();
        assert!(store.remove("/uploads/../secret").await.is_err());
    }
}
