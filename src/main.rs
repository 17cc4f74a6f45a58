//! FTP Gateway - HTTP access to an FTP server through an in-memory cache

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ftp_gateway::api::create_router;
use ftp_gateway::remote::FtpRemote;
use ftp_gateway::{spawn_sweep_task, AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect and log in to the FTP server (fatal on failure)
/// 4. Create the cache and gateway
/// 5. Start the optional expired-entry sweep
/// 6. Serve HTTP until SIGINT/SIGTERM, then close the FTP session
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ftp_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FTP Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ftp={}:{}, base_dir={}, cache_size={}MiB, ttl={}min, port={}",
        config.ftp_host,
        config.ftp_port,
        config.ftp_base_dir,
        config.cache_size_mb,
        config.cache_ttl_minutes,
        config.server_port
    );

    let settings = config.ftp_settings();
    let remote = tokio::task::spawn_blocking(move || FtpRemote::connect(&settings))
        .await
        .context("FTP connect task failed")??;

    let state = AppState::from_config(&config, Arc::new(remote.clone()));
    info!("Cache initialized");

    let sweep_handle = (config.cache_sweep_interval > 0).then(|| {
        spawn_sweep_task(
            state.gateway.cache(),
            Duration::from_secs(config.cache_sweep_interval),
        )
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving files on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("HTTP server error")?;

    remote.quit().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
