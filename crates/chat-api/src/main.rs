//! HTTP API for the anonymous chat matchmaker.
//!
//! Exposes registration, matchmaking, message exchange, rating and session
//! termination as JSON endpoints backed by a SQLite database.

mod config;
mod error;
mod extract;
mod routes;
mod state;

use database::Database;
use matchmaker::Matchmaker;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting chat API server");

    // Connect to database
    let db = Database::connect_with_options(
        &config.database_url,
        config.pool_size,
        config.busy_timeout,
    )
    .await?;
    db.migrate().await?;

    // Build application state
    let state = AppState::new(Matchmaker::new(db.clone()));

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Chat API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Chat API stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
