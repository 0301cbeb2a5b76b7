//! Registration, login, and current-user handlers.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse};
use tracing::info;

use drive_core::error::AppError;
use drive_entity::user::CreateUser;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.username.trim().is_empty() {
        return Err(AppError::validation("Username cannot be empty").into());
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address").into());
    }
    if req.password.len() < 8 {
        return Err(AppError::validation("Password must be at least 8 characters").into());
    }

    let hashed_password = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .user_repo
        .create(&CreateUser {
            username: req.username,
            email: req.email,
            hashed_password,
        })
        .await?;

    info!(user_id = %user.id, "Account registered");
    Ok(Json(serde_json::json!({
        "success": true,
        "data": UserResponse::from(user),
    })))
}

/// POST /api/auth/login
///
/// Returns the bearer token and also sets it as an HttpOnly cookie so
/// browser clients stay logged in without storing the token themselves.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid email or password"))?;

    if !state
        .password_hasher
        .verify_password(&req.password, &user.hashed_password)?
    {
        return Err(AppError::authentication("Invalid email or password").into());
    }

    let (access_token, expires_at) = state
        .jwt_encoder
        .generate_access_token(user.id, &user.username)?;

    let max_age = state.config.auth.jwt_access_ttl_minutes * 60;
    let cookie = format!("access_token={access_token}; HttpOnly; Path=/; Max-Age={max_age}");

    info!(user_id = %user.id, "User logged in");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(serde_json::json!({
            "success": true,
            "data": TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
                expires_at,
            },
        })),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .user_repo
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": UserResponse::from(user),
    })))
}
