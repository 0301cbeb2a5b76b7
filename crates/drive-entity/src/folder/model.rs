//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use drive_core::path;

/// A folder in a user's virtual hierarchy.
///
/// The hierarchy is represented by canonical `drive_path` strings with
/// prefix semantics; a folder's ancestors are derived by stripping
/// trailing path segments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Leaf segment of the folder path.
    pub name: String,
    /// Canonical virtual path of the folder itself (e.g., `/work/docs/`).
    pub drive_path: String,
    /// The folder owner.
    pub owner_id: Uuid,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Canonical path of the parent folder, `"/"` for top-level folders.
    pub fn parent_path(&self) -> String {
        path::parent_path(&self.drive_path).unwrap_or_else(|| path::ROOT.to_string())
    }
}

/// Data required to create a new folder record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Leaf segment of the folder path.
    pub name: String,
    /// Canonical virtual path of the folder itself.
    pub drive_path: String,
    /// The folder owner.
    pub owner_id: Uuid,
}

impl CreateFolder {
    /// Build a creation record for the folder at a canonical path.
    pub fn at_path(owner_id: Uuid, drive_path: &str) -> Self {
        Self {
            name: path::leaf_name(drive_path).unwrap_or_default().to_string(),
            drive_path: drive_path.to_string(),
            owner_id,
        }
    }
}
