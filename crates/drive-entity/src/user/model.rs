//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account. Every folder and file belongs to exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Unique email address used for login.
    pub email: String,
    /// Argon2id password hash. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to register a new account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Argon2id password hash.
    pub hashed_password: String,
}
