//! Local filesystem volume — the local half of the blob store.
//!
//! Files live in per-owner directories under a configured root and are
//! addressed by paths relative to that root (`<owner_id>/<stored_name>`).
//! Stored names are collision-free by construction, so writes never
//! clobber existing content.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;

/// Local persistent volume rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct LocalVolume {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalVolume {
    /// Create a new volume rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::LocalBackend,
                format!("Failed to create volume root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::LocalBackend,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Write bytes to a file at the given relative path.
    pub async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::LocalBackend,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Wrote local file");
        Ok(())
    }

    /// Read a file back into memory.
    pub async fn read(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Local file not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::LocalBackend,
                    format!("Failed to read file: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Rename a file within the volume.
    ///
    /// The local volume is best-effort cache in this design: a missing
    /// source file is logged and tolerated (returns `false`). Any other
    /// I/O failure is fatal.
    pub async fn rename(&self, from: &str, to: &str) -> AppResult<bool> {
        let from_path = self.resolve(from);
        let to_path = self.resolve(to);

        if !from_path.exists() {
            warn!(from, "Local file missing during rename, skipping");
            return Ok(false);
        }
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::LocalBackend,
                format!("Failed to rename {from} -> {to}"),
                e,
            )
        })?;
        Ok(true)
    }

    /// Delete a file. Deleting a missing file is not an error.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::LocalBackend,
                    format!("Failed to delete file: {path}"),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Check whether a file exists at the given relative path.
    pub async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let volume = LocalVolume::new(dir.path().to_str().unwrap()).await.unwrap();

        let data = Bytes::from("hello world");
        volume.write("owner/file.txt", data.clone()).await.unwrap();

        assert!(volume.exists("owner/file.txt").await.unwrap());
        assert_eq!(volume.read("owner/file.txt").await.unwrap(), data);

        volume.delete("owner/file.txt").await.unwrap();
        assert!(!volume.exists("owner/file.txt").await.unwrap());

        // Deleting again is a no-op.
        volume.delete("owner/file.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let volume = LocalVolume::new(dir.path().to_str().unwrap()).await.unwrap();

        volume.write("o/a.txt", Bytes::from("content")).await.unwrap();
        let moved = volume.rename("o/a.txt", "o/b.txt").await.unwrap();

        assert!(moved);
        assert!(!volume.exists("o/a.txt").await.unwrap());
        assert_eq!(volume.read("o/b.txt").await.unwrap(), Bytes::from("content"));
    }

    #[tokio::test]
    async fn test_rename_missing_source_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let volume = LocalVolume::new(dir.path().to_str().unwrap()).await.unwrap();

        let moved = volume.rename("o/nope.txt", "o/other.txt").await.unwrap();
        assert!(!moved);
    }
}
