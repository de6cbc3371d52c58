use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use revslot::auth::AuthClient;
use revslot::booking::BookingEngine;
use revslot::config::AppConfig;
use revslot::db::ReviewDbManager;
use revslot::server;
use revslot::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = if Path::new(&config_path).exists() {
        AppConfig::load_from_file(Path::new(&config_path))
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", config_path, e))?
    } else {
        warn!("Config file {} not found, using defaults", config_path);
        AppConfig::default()
    };

    let db = Arc::new(ReviewDbManager::new(&config.db_path));
    let auth = AuthClient::new(config.auth_config()).context("Failed to build identity client")?;
    let engine = BookingEngine::new(db.clone());

    let state = Arc::new(AppState {
        db,
        engine,
        auth,
        config: config.clone(),
    });

    let router = server::create_router(state);
    let addr = format!("{}:{}", config.address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
