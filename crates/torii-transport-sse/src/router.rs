//! Axum router for the SSE/JSON-RPC transport.
//! Routes: `GET /sse` (stream), `POST /rpc/:session_id` (upload),
//! plus `GET /health` and `GET /health/ready` when exposed.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use torii_protocol::{error_codes, null_id_error};
use torii_session::{
    Dispatch, Outbound, SessionInput, SessionManager, SessionRecord, SessionRegistry,
    TransportKind,
};

use crate::codec::SseChunk;

/// Outbound channel capacity per SSE session.
const OUTBOUND_CAPACITY: usize = 64;

/// Transport-level settings.
#[derive(Debug, Clone)]
pub struct SseTransportConfig {
    /// URL prefix the routes are mounted under ("" or "/prefix").
    pub path_prefix: String,
    /// Close the stream after this much outbound silence.
    pub idle_timeout: Duration,
    /// Whether the liveness routes are mounted.
    pub expose_health: bool,
}

impl Default for SseTransportConfig {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            idle_timeout: Duration::from_secs(300),
            expose_health: false,
        }
    }
}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct SseState {
    /// The process-wide session registry.
    pub registry: Arc<SessionRegistry>,
    /// The protocol dispatcher driving every session.
    pub dispatcher: Arc<dyn Dispatch>,
    /// Transport settings.
    pub config: SseTransportConfig,
}

/// Builds the axum `Router` with all transport routes.
pub fn build_router(state: SseState) -> Router {
    let mut router = Router::new()
        .route("/sse", get(handle_sse))
        .route("/rpc/:session_id", post(handle_rpc));
    if state.config.expose_health {
        router = router
            .route("/health", get(handle_health))
            .route("/health/ready", get(handle_ready));
    }

    let prefix = state.config.path_prefix.clone();
    let router = router.with_state(state);
    if prefix.is_empty() {
        router
    } else {
        Router::new().nest(&prefix, router)
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "torii"}))
}

/// Readiness probe — returns `200 OK` once the server is accepting requests.
async fn handle_ready() -> impl IntoResponse {
    Json(json!({"status": "ready", "service": "torii"}))
}

/// Opens a stream, binds a new session to it, and forwards the
/// session's outbound messages as SSE chunks until the client
/// disconnects or the idle timeout fires.
async fn handle_sse(State(state): State<SseState>) -> Response {
    let session_id = Uuid::new_v4().to_string();
    let (owner, mut outbound_rx) = mpsc::channel::<Outbound>(OUTBOUND_CAPACITY);
    let mailbox = SessionManager::spawn(
        &session_id,
        state.registry.clone(),
        state.dispatcher.clone(),
        owner.clone(),
    );
    let record = SessionRecord::new(&session_id, TransportKind::Sse, owner, mailbox);
    if let Err(e) = state.registry.register(record) {
        error!(session_id = %session_id, error = %e, "failed to register sse session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(null_id_error(
                error_codes::INTERNAL_ERROR,
                "failed to register session",
            )),
        )
            .into_response();
    }

    let rpc_path = format!("{}/rpc/{}", state.config.path_prefix, session_id);
    info!(session_id = %session_id, rpc_path = %rpc_path, "sse stream opened");

    let registry = state.registry.clone();
    let idle_timeout = state.config.idle_timeout;
    let stream = async_stream::stream! {
        yield Ok::<Bytes, Infallible>(Bytes::from(
            SseChunk::named("endpoint", rpc_path).to_bytes(),
        ));
        loop {
            match tokio::time::timeout(idle_timeout, outbound_rx.recv()).await {
                Ok(Some(outbound)) => {
                    yield Ok(Bytes::from(SseChunk::from(outbound).to_bytes()));
                }
                Ok(None) => {
                    debug!(session_id = %session_id, "outbound channel closed");
                    break;
                }
                Err(_) => {
                    info!(session_id = %session_id, "sse stream idle timeout");
                    break;
                }
            }
        }
        // Abrupt client disconnects drop this stream instead; the
        // registry's owner monitor covers that path.
        registry.unregister(&session_id);
    };

    (
        [
            (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Accepts one JSON-RPC message per POST and hands it to the session's
/// manager. The real response flows over the SSE stream; the POST only
/// acknowledges receipt.
async fn handle_rpc(
    State(state): State<SseState>,
    Path(session_id): Path<String>,
    body: String,
) -> Response {
    let message: Value = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "unparseable rpc body");
            return (
                StatusCode::BAD_REQUEST,
                Json(null_id_error(
                    error_codes::PARSE_ERROR,
                    &format!("parse error: {e}"),
                )),
            )
                .into_response();
        }
    };

    let record = match state.registry.lookup(&session_id) {
        Ok(record) => record,
        Err(_) => {
            debug!(session_id = %session_id, "rpc for unknown session");
            return (
                StatusCode::NOT_FOUND,
                Json(null_id_error(
                    error_codes::UNKNOWN_SESSION,
                    "Unknown or expired session ID",
                )),
            )
                .into_response();
        }
    };

    match record.mailbox.send(SessionInput::Message(message)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(_) => {
            // No live owner to deliver through; surface the error on
            // the POST instead.
            warn!(session_id = %session_id, "session mailbox closed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(null_id_error(
                    error_codes::INTERNAL_ERROR,
                    "Session owner is gone",
                )),
            )
                .into_response()
        }
    }
}
