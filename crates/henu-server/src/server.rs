//! Listener setup and graceful shutdown.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use henu_config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::routes::router;
use crate::state::AppState;

/// Default graceful shutdown timeout.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration =
    Duration::from_secs(henu_core::DEFAULT_SHUTDOWN_TIMEOUT_SECS);

/// Run the server with a cancellation token for graceful shutdown.
pub async fn run_with_shutdown(config: Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let state = AppState::from_config(&config).await?;
    serve(
        state,
        &config.server.listen,
        config.server.max_body_bytes,
        Duration::from_secs(config.server.shutdown_timeout_secs),
        shutdown,
    )
    .await
}

/// Serve `state` on `listen` until `shutdown` fires.
///
/// In-flight requests get `grace` to finish. Session events from the
/// identity provider are synced in the background for the server's lifetime.
pub async fn serve(
    state: AppState,
    listen: &str,
    max_body_bytes: usize,
    grace: Duration,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|_| ServerError::Config(format!("invalid listen address {listen:?}")))?;

    let sync_task = state
        .sync
        .clone()
        .spawn(state.identity.subscribe(), shutdown.child_token());

    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "listening");

    let server = axum::serve(listener, router(state, max_body_bytes))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown.cancelled() => {
            info!("shutdown signal received, draining requests");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(timeout_secs = grace.as_secs(), "shutdown timeout, dropping open requests"),
            }
        }
    }

    sync_task.abort();
    info!("server stopped");
    Ok(())
}

/// Run the server (blocking until error, no graceful shutdown).
pub async fn run(config: Config) -> Result<(), ServerError> {
    run_with_shutdown(config, CancellationToken::new()).await
}
