//! The bundled echo toolbox.
//!
//! A minimal handler that makes the binary usable end-to-end: one
//! `echo` tool returning its `message` argument as text content.

use async_trait::async_trait;
use serde_json::{json, Value};

use torii_handler::{HandlerError, HandlerResult, McpHandler};
use torii_protocol::mcp::initialize::InitializeParams;
use torii_protocol::RequestId;

/// Handler exposing the `echo` tool.
pub struct EchoToolbox;

impl EchoToolbox {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EchoToolbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpHandler for EchoToolbox {
    async fn initialize(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        params: InitializeParams,
    ) -> HandlerResult {
        Ok(json!({
            "protocolVersion": params.protocol_version,
            "capabilities": {"tools": {}},
            "serverInfo": {
                "name": "torii",
                "version": env!("CARGO_PKG_VERSION"),
            }
        }))
    }

    async fn list_tools(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Ok(json!({
            "tools": [{
                "name": "echo",
                "description": "Echoes the message argument back as text",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Text to echo back"
                        }
                    },
                    "required": ["message"]
                }
            }]
        }))
    }

    async fn call_tool(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        name: &str,
        arguments: Value,
    ) -> HandlerResult {
        match name {
            "echo" => {
                let message = arguments
                    .get("message")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        HandlerError::invalid_params("echo requires a string message argument")
                    })?;
                Ok(json!({
                    "content": [{"type": "text", "text": message}]
                }))
            }
            other => Err(HandlerError::tool_not_found(other)),
        }
    }
}
