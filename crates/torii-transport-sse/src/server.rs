//! HTTP server that binds the transport router to a TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use torii_session::{SessionInput, SessionRegistry};

use crate::error::SseTransportError;
use crate::router::{build_router, SseState};

/// Axum-based HTTP server for the SSE transport.
pub struct SseServer {
    pub(crate) addr: SocketAddr,
    pub(crate) state: SseState,
}

impl SseServer {
    /// Creates a new server bound to `addr` once run.
    pub fn new(addr: SocketAddr, state: SseState) -> Self {
        Self { addr, state }
    }

    /// Starts the server and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP bind fails or the server crashes.
    pub async fn run(self) -> Result<(), SseTransportError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| SseTransportError::Bind {
                addr: self.addr.to_string(),
                source: e,
            })?;

        tracing::info!(addr = %self.addr, "torii MCP SSE server ready");

        let registry = self.state.registry.clone();
        let router = build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(registry))
            .await
            .map_err(|e| SseTransportError::Serve(e.to_string()))?;

        Ok(())
    }
}

/// Waits for ctrl-c, then asks every live session to wind down so the
/// open SSE streams close and graceful shutdown can complete.
async fn shutdown_signal(registry: Arc<SessionRegistry>) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler");
    }
    tracing::info!(sessions = registry.count(), "shutdown signal received");
    for record in registry.list().into_values() {
        let _ = record.mailbox.try_send(SessionInput::Shutdown);
    }
}
