//! cue-ledger server entry point.
//!
//! Loads configuration, hydrates the ledger and serves the REST API.

use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cue_ledger::api;
use cue_ledger::app_state::AppState;
use cue_ledger::config::{LedgerConfig, LogFormat};
use cue_ledger::service::LedgerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config =
        LedgerConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        persistence = config.persistence_enabled,
        "starting cue-ledger"
    );

    // Build service layer
    let service = LedgerService::bootstrap(&config)
        .await
        .context("failed to initialise ledger")?;
    let listen_addr = config.listen_addr;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    // Build application state
    let app_state = AppState::new(service, config);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
