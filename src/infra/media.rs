//! Filesystem media storage for post images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use slug::slugify;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::application::repos::{MediaStore, MediaStoreError};

/// Errors that can occur while interacting with the media storage backend.
#[derive(Debug, Error)]
pub enum MediaStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("payload is empty")]
    EmptyPayload,
}

/// Result of storing an image payload.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub stored_path: String,
    pub checksum: String,
    pub size_bytes: i64,
}

/// Filesystem-backed image storage rooted at the configured directory.
/// Stored paths are relative, dated, and safe to join under the public
/// media base.
#[derive(Debug)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    /// Initialise storage rooted at the provided directory, creating it if
    /// necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store the payload and return metadata describing the stored asset.
    pub async fn store(
        &self,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredMedia, MediaStorageError> {
        if data.is_empty() {
            return Err(MediaStorageError::EmptyPayload);
        }

        let stored_path = self.build_stored_path(original_name);
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let checksum = hex::encode(hasher.finalize());
        let size_bytes = data.len() as i64;

        let mut file = fs::File::create(&absolute).await?;
        if let Err(err) = file.write_all(&data).await {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(MediaStorageError::Io(err));
        }
        file.flush().await?;

        Ok(StoredMedia {
            stored_path,
            checksum,
            size_bytes,
        })
    }

    /// Read a stored payload back into memory.
    pub async fn read(&self, stored_path: &str) -> Result<Bytes, MediaStorageError> {
        let absolute = self.resolve(stored_path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Remove a stored payload. Missing files are treated as success.
    pub async fn delete(&self, stored_path: &str) -> Result<(), MediaStorageError> {
        let absolute = self.resolve(stored_path)?;
        match fs::remove_file(&absolute).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediaStorageError::Io(err)),
        }
    }

    /// Resolve the absolute filesystem path for a stored asset, refusing
    /// absolute and parent-traversing inputs.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf, MediaStorageError> {
        let relative = Path::new(stored_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(MediaStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }

    fn build_stored_path(&self, original_name: &str) -> String {
        let (year, month, day) = time::OffsetDateTime::now_utc().to_calendar_date();
        let directory = format!("{year}/{:02}/{:02}", month as u8, day);
        let identifier = Uuid::new_v4();
        let filename = sanitize_filename(original_name);
        format!("{directory}/{identifier}-{filename}")
    }
}

#[async_trait]
impl MediaStore for MediaStorage {
    async fn store(&self, original_name: &str, data: Bytes) -> Result<String, MediaStoreError> {
        MediaStorage::store(self, original_name, data)
            .await
            .map(|stored| stored.stored_path)
            .map_err(|err| match err {
                MediaStorageError::InvalidPath => MediaStoreError::InvalidPath,
                MediaStorageError::EmptyPayload => MediaStoreError::EmptyPayload,
                MediaStorageError::Io(io) => MediaStoreError::Storage(io.to_string()),
            })
    }

    async fn remove(&self, stored_path: &str) -> Result<(), MediaStoreError> {
        MediaStorage::delete(self, stored_path)
            .await
            .map_err(|err| match err {
                MediaStorageError::InvalidPath => MediaStoreError::InvalidPath,
                MediaStorageError::EmptyPayload => MediaStoreError::EmptyPayload,
                MediaStorageError::Io(io) => MediaStoreError::Storage(io.to_string()),
            })
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("image");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "image".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

/// Join a stored relative path onto the configured public media base.
/// Absolute URLs pass through untouched so externally hosted images keep
/// working.
pub fn public_url(media_base: &str, stored: &str) -> String {
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }
    format!(
        "{}/{}",
        media_base.trim_end_matches('/'),
        stored.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_slugified_with_extension_kept() {
        assert_eq!(sanitize_filename("Front Elevation.JPG"), "front-elevation.jpg");
        assert_eq!(sanitize_filename("..."), "image");
        assert_eq!(sanitize_filename("no_ext"), "no-ext");
    }

    #[test]
    fn public_url_joins_relative_paths_and_passes_absolute_ones() {
        assert_eq!(
            public_url("/media", "2026/08/one.jpg"),
            "/media/2026/08/one.jpg"
        );
        assert_eq!(
            public_url("https://cdn.example.com/media/", "/2026/08/one.jpg"),
            "https://cdn.example.com/media/2026/08/one.jpg"
        );
        assert_eq!(
            public_url("/media", "https://elsewhere.example/pic.png"),
            "https://elsewhere.example/pic.png"
        );
    }
}
