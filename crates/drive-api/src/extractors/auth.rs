//! `AuthUser` extractor — resolves the access token into a request context.
//!
//! The token is read from the `access_token` cookie first and the
//! `Authorization: Bearer` header second, matching the web client's dual
//! login flow.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use drive_core::error::AppError;
use drive_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_cookie(parts)
            .or_else(|| token_from_bearer(parts))
            .ok_or_else(|| ApiError(AppError::authentication("Not logged in")))?;

        let claims = state.jwt_decoder.decode_access_token(&token)?;

        Ok(AuthUser(RequestContext::new(claims.sub, claims.username)))
    }
}

fn token_from_cookie(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "access_token").then(|| value.to_string())
    })
}

fn token_from_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}
