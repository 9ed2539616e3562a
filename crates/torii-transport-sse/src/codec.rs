//! SSE chunk formatting.
//!
//! Two chunk shapes leave the server:
//!
//! ```text
//! event: <name>\ndata: <payload>\n\n     named event
//! data: <payload>\n\n                    unnamed message
//! ```
//!
//! Named events are used for the one `endpoint` bootstrap chunk and the
//! one `InitializeResult` per session; every later JSON-RPC response or
//! notification is an unnamed message.

use torii_session::Outbound;

/// One formatted SSE chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseChunk {
    /// Event name for named chunks.
    pub event: Option<String>,
    /// The data line. JSON payloads serialize compactly, so a chunk is
    /// always a single `data:` line.
    pub data: String,
}

impl SseChunk {
    /// A named event chunk.
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
        }
    }

    /// An unnamed message chunk.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }

    /// Wire bytes of the chunk.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.event {
            Some(event) => format!("event: {event}\ndata: {}\n\n", self.data).into_bytes(),
            None => format!("data: {}\n\n", self.data).into_bytes(),
        }
    }
}

impl From<Outbound> for SseChunk {
    fn from(outbound: Outbound) -> Self {
        Self {
            event: outbound.event,
            data: outbound.payload.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_event_bytes() {
        let chunk = SseChunk::named("endpoint", "/rpc/0193-abc");
        assert_eq!(chunk.to_bytes(), b"event: endpoint\ndata: /rpc/0193-abc\n\n");
    }

    #[test]
    fn unnamed_message_bytes() {
        let chunk = SseChunk::message(r#"{"jsonrpc":"2.0"}"#);
        assert_eq!(chunk.to_bytes(), b"data: {\"jsonrpc\":\"2.0\"}\n\n");
    }

    #[test]
    fn named_outbound_converts_to_named_chunk() {
        let out = Outbound::named("InitializeResult", json!({"ok": true}));
        let chunk = SseChunk::from(out);
        assert_eq!(chunk.event.as_deref(), Some("InitializeResult"));
        assert_eq!(chunk.data, "{\"ok\":true}");
    }

    #[test]
    fn unnamed_outbound_converts_to_message_chunk() {
        let out = Outbound::message(json!({"id": 1}));
        let chunk = SseChunk::from(out);
        assert!(chunk.event.is_none());
        assert_eq!(chunk.to_bytes(), b"data: {\"id\":1}\n\n");
    }
}
