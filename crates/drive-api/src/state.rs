//! Shared application state threaded through every handler.

use std::sync::Arc;

use drive_auth::{JwtDecoder, JwtEncoder, PasswordHasher};
use drive_core::config::AppConfig;
use drive_database::repositories::user::UserRepository;
use drive_service::HierarchyService;

/// Application state available to all handlers via Axum's `State`
/// extractor. Constructed once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Account repository.
    pub user_repo: Arc<UserRepository>,
    /// Hierarchy mutation engine.
    pub hierarchy: Arc<HierarchyService>,
    /// Access-token issuer.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// Access-token validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher.
    pub password_hasher: Arc<PasswordHasher>,
}
