//! Route definitions for the Nimbus Drive HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use drive_core::config::server::ServerConfig;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = build_cors_layer(&state.config.server);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(drive_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: register, login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Hierarchy endpoints: folders, files, listing
fn drive_routes() -> Router<AppState> {
    Router::new()
        .route("/drive/entries", get(handlers::file::list_entries))
        .route("/drive/files", post(handlers::file::save_file))
        .route("/drive/files/{id}/rename", put(handlers::file::rename_file))
        .route("/drive/files/{id}", delete(handlers::file::delete_file))
        .route(
            "/drive/folders",
            post(handlers::folder::create_folder).delete(handlers::folder::delete_folder),
        )
        .route(
            "/drive/folders/rename",
            put(handlers::folder::rename_folder),
        )
}

/// CORS layer from configured origins. A `*` entry allows any origin
/// without credentials; an explicit list allows cookies.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
