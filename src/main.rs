//! Nimbus Drive server — personal dual-backend cloud drive.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use drive_core::config::AppConfig;
use drive_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("DRIVE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Nimbus Drive v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db_pool = drive_database::DatabasePool::connect(&config.database).await?;
    drive_database::migration::run_migrations(db_pool.pool()).await?;

    // ── Storage backends ─────────────────────────────────────────
    tracing::info!("Initializing storage backends...");
    let local = drive_storage::LocalVolume::new(&config.storage.local.root_path).await?;
    let remote = drive_storage::remote::build_object_store(&config.storage).await?;
    let blobs = Arc::new(drive_storage::BlobStore::new(local, remote));
    tracing::info!("Storage backends initialized");

    // ── Repositories and services ────────────────────────────────
    let user_repo = Arc::new(drive_database::repositories::user::UserRepository::new(
        db_pool.pool().clone(),
    ));
    let index = Arc::new(drive_database::index::PgHierarchyIndex::new(
        db_pool.pool().clone(),
    ));
    let hierarchy = Arc::new(drive_service::HierarchyService::new(index, blobs));

    // ── Auth ─────────────────────────────────────────────────────
    let jwt_encoder = Arc::new(drive_auth::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(drive_auth::JwtDecoder::new(&config.auth));
    let password_hasher = Arc::new(drive_auth::PasswordHasher::new());

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = drive_api::AppState {
        config: Arc::new(config),
        user_repo,
        hierarchy,
        jwt_encoder,
        jwt_decoder,
        password_hasher,
    };
    let app = drive_api::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Nimbus Drive listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db_pool.close().await;
    tracing::info!("Nimbus Drive shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
