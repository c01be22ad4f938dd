//! pastecache server binary
//!
//! Runs the cache and memory monitor in-process and exposes the admin API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pastecache::api::{create_router, AppState};
use pastecache::memory::{CountingAllocator, SharedMonitor};
use pastecache::{spawn_cleanup_task, start_monitoring, stop_monitoring, Config};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create cache and memory monitor
/// 4. Start background cleanup and memory sampling
/// 5. Serve the admin API on the configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to info, overridable with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pastecache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pastecache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_items={}, default_ttl={:?}, cleanup_interval={:?}, monitor_interval={:?}, port={}",
        config.cache.max_items,
        config.cache.default_ttl,
        config.cache.cleanup_interval,
        config.monitor.monitor_interval,
        config.server_port
    );

    let state = AppState::from_config(&config);

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cache.cleanup_interval);
    start_monitoring(&state.memory).await;

    let shutdown = shutdown_signal(cleanup_handle, state.memory.clone());
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops both
/// background tasks.
async fn shutdown_signal(cleanup_handle: JoinHandle<()>, memory: SharedMonitor) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    stop_monitoring(&memory).await;
    warn!("Background tasks stopped");
}
