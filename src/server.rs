//! HTTP server initialization and runtime setup.

use crate::config::Config;
use crate::routes::{app_router, route_table};
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Application state (policies, summary sink, user directory)
/// - Router and middleware stack
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - A configuration value cannot be turned into a policy
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid LISTEN address '{}'", config.listen_addr))?;

    if !config.static_root.is_dir() {
        tracing::warn!(
            "Static root {} does not exist; static files will 404",
            config.static_root.display()
        );
    }

    let state = AppState::new(config, route_table())?;
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
