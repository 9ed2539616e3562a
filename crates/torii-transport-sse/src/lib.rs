//! # torii-transport-sse
//!
//! The SSE + HTTP POST transport: a `GET /sse` stream carries
//! everything server-to-client, while clients upload JSON-RPC requests
//! with `POST /rpc/{session_id}`. Each stream is one session; the
//! stream writer is the session's owner and its death tears the
//! session down.

pub mod codec;
pub mod error;
pub mod router;
pub mod server;

pub use codec::SseChunk;
pub use error::SseTransportError;
pub use router::{build_router, SseState, SseTransportConfig};
pub use server::SseServer;
