//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file stored in a user's drive.
///
/// Content is held redundantly in two backends: `physical_path` locates
/// the copy on the local volume, `remote_key`/`remote_url` locate the copy
/// in the remote object store. `drive_path` is the canonical path of the
/// **containing** folder, not of the file itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// User-visible file name (including extension).
    pub original_name: String,
    /// Collision-free physical name, `<base>_<random-suffix><ext>`.
    pub stored_name: String,
    /// Location on the local volume, relative to the volume root.
    pub physical_path: String,
    /// Canonical path of the containing folder.
    pub drive_path: String,
    /// MIME type of the file.
    pub content_type: Option<String>,
    /// Key of the object in the remote store.
    pub remote_key: String,
    /// Public URL of the remote object.
    pub remote_url: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// The file extension of the user-visible name (with leading dot), if
    /// any. A leading dot alone (`.env`) is not an extension.
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.original_name)
    }
}

/// The extension of a file name (with leading dot), if any.
pub fn extension_of(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(idx) if idx > 0 => Some(&name[idx..]),
        _ => None,
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// User-visible file name.
    pub original_name: String,
    /// Collision-free physical name.
    pub stored_name: String,
    /// Location on the local volume.
    pub physical_path: String,
    /// Canonical path of the containing folder.
    pub drive_path: String,
    /// MIME type.
    pub content_type: Option<String>,
    /// Key of the object in the remote store.
    pub remote_key: String,
    /// Public URL of the remote object.
    pub remote_url: String,
    /// The file owner.
    pub owner_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.pdf"), Some(".pdf"));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".env"), None);
    }
}
