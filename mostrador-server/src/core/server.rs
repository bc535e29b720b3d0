//! HTTP server

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::routes::build_app;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C or until the state's shutdown token is cancelled
    ///
    /// Shutdown cancels the token first so pending report loads return
    /// early, then waits up to `SHUTDOWN_TIMEOUT_MS` for open requests.
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!("Mostrador server listening on {}", addr);

        let app = build_app(&state);
        let token = state.shutdown.clone();
        let shutdown = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down...");
                }
                _ = token.cancelled() => {}
            }
            token.cancel();
        };

        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .into_future();

        // the grace period starts once shutdown has been requested
        let cancelled = state.shutdown.clone();
        tokio::select! {
            result = serve => result?,
            _ = async {
                cancelled.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_ms = self.config.shutdown_timeout_ms, "Graceful shutdown timed out");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
