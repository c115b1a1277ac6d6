//! League Backend Service
//!
//! Main entry point for the sports league registration backend.
//! This service provides:
//! - JSON HTTP API for submissions, admin review and desk verification
//! - Background task purging expired admin sessions

use anyhow::Context;
use league_backend::api;
use league_backend::config::AppConfig;
use league_backend::database::{create_pool, run_migrations};
use league_backend::services::AuditTrailService;
use league_backend::AppState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "league_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;

    init_tracing(&config);

    info!("League Backend Service starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================

    info!("Connecting to database...");
    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        e
    })?;
    info!(
        "Database pool ready (max connections: {})",
        config.database.max_connections
    );

    info!("Running database migrations...");
    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        e
    })?;
    info!("Database migrations completed successfully");

    // =========================================================================
    // SERVICES
    // =========================================================================

    let audit = AuditTrailService::new(&config.audit_log_dir)
        .context("Audit trail initialization failed")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::postgres(pool, config, audit);
    info!("Application state initialized");

    // Expired admin sessions are only rejected on read; drop them periodically
    let authenticator = state.authenticator.clone();
    let purge_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match authenticator.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired admin sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });

    // =========================================================================
    // HTTP SERVER
    // =========================================================================

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    purge_handle.abort();
    info!("League Backend Service stopped");
    Ok(())
}
