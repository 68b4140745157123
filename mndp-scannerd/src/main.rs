mod api;
mod config;
mod mndp;
mod notifier;
mod registry;
mod registry_manager;

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use shared::types::DeviceSnapshot;
use crate::config::Config;
use crate::mndp::host::HostInfo;
use crate::notifier::Notifier;
use crate::registry::{hash, DeviceRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mndp_scannerd=info"))
        )
        .init();

    tracing::info!("Starting mndp-scannerd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/mndp-scanner/scannerd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    let registry = Arc::new(DeviceRegistry::new());
    let notifier = Arc::new(Notifier::new());

    let (hash_tx, hash_rx) = watch::channel(hash::compute_hash(&DeviceSnapshot::new()));

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Spawn beacon task
    let host = HostInfo::new(config.announce.clone());
    let beacon_cancel = cancel.clone();
    let beacon_handle = tokio::spawn(async move {
        if let Err(e) = mndp::beacon::run_beacon(host, beacon_cancel).await {
            tracing::error!("Beacon error: {:#}", e);
        }
    });

    // Spawn listener task
    let (listener_tx, listener_rx) = mpsc::channel(256);
    let listener_cancel = cancel.clone();
    let listener_handle = tokio::spawn(async move {
        if let Err(e) = mndp::listener::run_listener(listener_tx, listener_cancel).await {
            tracing::error!("Listener error: {:#}", e);
        }
    });

    // Spawn registry manager task
    let mgr_cancel = cancel.clone();
    let mgr_registry = registry.clone();
    let mgr_notifier = notifier.clone();
    let mgr_handle = tokio::spawn(async move {
        if let Err(e) = registry_manager::run(mgr_registry, mgr_notifier, hash_tx, listener_rx, mgr_cancel).await {
            tracing::error!("Registry manager error: {:#}", e);
        }
    });

    // Build API router
    let app_state = api::routes::AppState {
        registry,
        notifier,
        hash_rx,
    };
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("Web server started on http://{}", config.api.listen);

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    // Trigger cancellation
    cancel.cancel();

    // Wait for all tasks to complete
    let _ = tokio::join!(beacon_handle, listener_handle, mgr_handle, server_handle);

    tracing::info!("Shutdown complete");
    Ok(())
}
