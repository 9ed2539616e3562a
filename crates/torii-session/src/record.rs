//! The session record stored in the registry.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::mpsc;

use torii_protocol::mcp::initialize::{ClientInfo, ServerInfo};

use crate::manager::{Outbound, SessionInput};

/// Which wire model a session is bound to. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// SSE stream + HTTP POST upload channel.
    Sse,
    /// Length-prefixed frames over stdin/stdout.
    Stdio,
}

impl TransportKind {
    /// Wire-level name of the transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Stdio => "stdio",
        }
    }
}

/// One live session, keyed by its id in the registry.
///
/// `owner` is the outbound-delivery endpoint (the receiver end lives in
/// the transport's write loop); the registry monitors it and removes
/// the record when it closes. `mailbox` is the handle to the session's
/// manager actor. The negotiated fields are set exactly once by the
/// dispatcher on a successful `initialize` and never mutated again.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Unique session identifier (lowercase hyphenated UUID).
    pub session_id: String,
    /// Transport this session is bound to.
    pub transport: TransportKind,
    /// Outbound-delivery endpoint; monitored for liveness.
    pub owner: mpsc::Sender<Outbound>,
    /// Inbound handle to the session's manager actor.
    pub mailbox: mpsc::Sender<SessionInput>,
    /// False until the initialize handshake completes.
    pub initialized: bool,
    /// Negotiated protocol version.
    pub protocol_version: Option<String>,
    /// Client identity from `initialize` params.
    pub client_info: Option<ClientInfo>,
    /// Server identity mirrored from the handler's initialize result.
    pub server_info: Option<ServerInfo>,
    /// Negotiated capabilities (opaque map from the handler).
    pub capabilities: Option<Value>,
    /// Tool descriptors added through the `tools/register` extension.
    pub custom_tools: HashMap<String, Value>,
    /// Creation time.
    pub created_at: Instant,
}

impl SessionRecord {
    /// Creates a fresh, uninitialized record.
    pub fn new(
        session_id: impl Into<String>,
        transport: TransportKind,
        owner: mpsc::Sender<Outbound>,
        mailbox: mpsc::Sender<SessionInput>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            transport,
            owner,
            mailbox,
            initialized: false,
            protocol_version: None,
            client_info: None,
            server_info: None,
            capabilities: None,
            custom_tools: HashMap::new(),
            created_at: Instant::now(),
        }
    }
}

/// Field-wise patch applied through [`crate::SessionRegistry::update`].
///
/// Each present field overwrites the record's value (last-writer-wins
/// per field); absent fields are left untouched. The whole patch is
/// applied atomically relative to other registry operations.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub initialized: Option<bool>,
    pub protocol_version: Option<String>,
    pub client_info: Option<ClientInfo>,
    pub server_info: Option<ServerInfo>,
    pub capabilities: Option<Value>,
    pub custom_tools: Option<HashMap<String, Value>>,
}

impl RecordPatch {
    pub(crate) fn apply(self, record: &mut SessionRecord) {
        if let Some(initialized) = self.initialized {
            record.initialized = initialized;
        }
        if let Some(version) = self.protocol_version {
            record.protocol_version = Some(version);
        }
        if let Some(client_info) = self.client_info {
            record.client_info = Some(client_info);
        }
        if let Some(server_info) = self.server_info {
            record.server_info = Some(server_info);
        }
        if let Some(capabilities) = self.capabilities {
            record.capabilities = Some(capabilities);
        }
        if let Some(custom_tools) = self.custom_tools {
            record.custom_tools = custom_tools;
        }
    }
}
