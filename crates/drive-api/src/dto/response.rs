//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drive_entity::file::File;
use drive_entity::folder::Folder;
use drive_entity::user::User;

/// Public account representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Account ID.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether the email address has been verified.
    pub is_verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Token scheme, always `bearer`.
    pub token_type: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Public folder representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: Uuid,
    /// Leaf name.
    pub name: String,
    /// Canonical virtual path.
    pub drive_path: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            drive_path: folder.drive_path,
        }
    }
}

/// Public file representation. Internal locations (`physical_path`,
/// `remote_key`) are deliberately not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    /// File ID.
    pub id: Uuid,
    /// User-visible name.
    pub original_name: String,
    /// Collision-free physical name.
    pub stored_name: String,
    /// Canonical path of the containing folder.
    pub drive_path: String,
    /// MIME type.
    pub content_type: Option<String>,
    /// Public URL of the remote object.
    pub remote_url: String,
}

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            original_name: file.original_name,
            stored_name: file.stored_name,
            drive_path: file.drive_path,
            content_type: file.content_type,
            remote_url: file.remote_url,
        }
    }
}
