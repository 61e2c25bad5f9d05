//! HTTP server lifecycle management.
//!
//! [`start_server`] binds the configured address and serves until
//! `Ctrl-C`. [`serve`] runs on an already bound listener with a caller
//! supplied shutdown future, which is how the integration tests drive it.

use std::future::Future;
use std::sync::Arc;

use busboard_core::config::ServerSection;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::router::build_router;
use crate::state::AppState;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
        }
    }
}

/// Start the busboard HTTP server.
///
/// Binds to the configured address and serves requests until `Ctrl-C`.
/// Returns `Ok(())` on clean shutdown.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind_listener(config).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Bind the configured `host:port`.
///
/// The host may be an IPv4 or IPv6 address or a name such as `localhost`.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the host does not resolve or the
/// address cannot be bound.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            ServerError::Bind(format!("bind failed on {}:{}: {e}", config.host, config.port))
        })?;

    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;
    info!(%addr, "busboard server listening");

    Ok(listener)
}

/// Serve on `listener` until `shutdown` completes.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("busboard server stopped");
    Ok(())
}

/// Resolve on `Ctrl-C`. If the signal handler cannot be installed, never
/// resolve, so the server keeps running.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
