//! # cruder-api binary
//!
//! Reads configuration from the environment, connects to Postgres, applies
//! migrations and serves the API until Ctrl-C.

use std::sync::Arc;

use cruder_api::auth::ApiKeyConfig;
use cruder_api::config::AppConfig;
use cruder_api::db::{self, PgUserRepository};
use cruder_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // JSON logs, one object per line. Request records carry their own
    // `timestamp` field, so the formatter's clock is switched off.
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;
    tracing::info!(config = ?config, "Configuration loaded");

    let pool = db::init_pool(&config.database).await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::with_repository(Arc::new(PgUserRepository::new(pool.clone())));
    let app = cruder_api::app(state, ApiKeyConfig::new(config.api_key.clone()));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("cruder API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
