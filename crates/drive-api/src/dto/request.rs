//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Body for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub username: String,
    /// Email address used for login.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Body for `POST /api/drive/folders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Virtual path of the folder to create, ancestors included.
    pub path: String,
}

/// Body for `PUT /api/drive/folders/rename`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFolderRequest {
    /// Current virtual path of the folder.
    pub old_path: String,
    /// New leaf name.
    pub new_name: String,
}

/// Body for `DELETE /api/drive/folders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFolderRequest {
    /// Virtual path of the folder to delete.
    pub path: String,
}

/// Body for `PUT /api/drive/files/{id}/rename`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFileRequest {
    /// New user-visible file name.
    pub new_name: String,
}
