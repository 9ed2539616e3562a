//! MCP initialize method types.
//!
//! The initialize handshake is the first message exchanged between
//! client and server to negotiate capabilities and protocol version.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client info sent during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

/// Server info returned during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

/// Request params for `initialize`.
///
/// Capabilities are carried opaquely; the dispatcher never interprets
/// them, it only hands them to the handler and stores the negotiated
/// result on the session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    /// Protocol version requested by client.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client capabilities (opaque map).
    #[serde(default)]
    pub capabilities: Value,
    /// Client info.
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

/// Response for `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    /// Protocol version agreed by server.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities (opaque map).
    #[serde(default)]
    pub capabilities: Value,
    /// Server info.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// MCP protocol version supported by this implementation.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialize_params_roundtrip() {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({"tools": {}}),
            client_info: ClientInfo {
                name: "test-client".to_string(),
                version: "1.0.0".to_string(),
            },
        };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: InitializeParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.protocol_version, PROTOCOL_VERSION);
        assert_eq!(back.client_info.name, "test-client");
    }

    #[test]
    fn initialize_params_capabilities_default_to_null() {
        let s = r#"{"protocolVersion":"2024-11-05","clientInfo":{"name":"c","version":"0"}}"#;
        let p: InitializeParams = serde_json::from_str(s).expect("deserialize");
        assert!(p.capabilities.is_null());
    }

    #[test]
    fn initialize_result_roundtrip() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({"tools": {}}),
            server_info: ServerInfo {
                name: "torii".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("serverInfo"));
        let back: InitializeResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.server_info.name, "torii");
    }
}
