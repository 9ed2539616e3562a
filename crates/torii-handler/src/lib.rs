//! # torii-handler
//!
//! Port definition (abstract trait) for MCP server back-ends.
//! The dispatcher routes every protocol method to an implementation of
//! [`McpHandler`]; tool, resource, and prompt logic live behind this
//! trait, never in the session/dispatch core.

mod error;

pub use error::{HandlerError, HandlerResult};

use async_trait::async_trait;
use serde_json::{json, Value};

use torii_protocol::mcp::initialize::{ClientInfo, InitializeParams};
use torii_protocol::RequestId;

/// Read-only snapshot of a session record, handed to notification
/// handlers. Handlers never touch the registry directly; the
/// dispatcher performs all state updates based on return values.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// The session this message belongs to.
    pub session_id: String,
    /// `"sse"` or `"stdio"`.
    pub transport: String,
    /// Whether the initialize handshake has completed.
    pub initialized: bool,
    /// Negotiated protocol version, if initialized.
    pub protocol_version: Option<String>,
    /// Client identity captured from `initialize`.
    pub client_info: Option<ClientInfo>,
}

/// The capability set a server implementation satisfies.
///
/// Every operation receives the session id and request id; `call_tool`
/// additionally receives the tool name as a separate argument. Default
/// bodies return MethodNotFound so an implementation only claims the
/// methods it supports; `ping` defaults to an empty success and
/// `notification` to a no-op.
#[async_trait]
pub trait McpHandler: Send + Sync + 'static {
    /// Handles `initialize`. The dispatcher has already validated the
    /// protocol version against its supported set; the returned map
    /// becomes the `InitializeResult` and its `protocolVersion`,
    /// `capabilities`, and `serverInfo` fields are stored on the
    /// session record.
    async fn initialize(
        &self,
        session_id: &str,
        request_id: &RequestId,
        params: InitializeParams,
    ) -> HandlerResult;

    /// Handles `ping`. The result content is discarded; the dispatcher
    /// always answers `{}`.
    async fn ping(&self, _session_id: &str, _request_id: &RequestId) -> HandlerResult {
        Ok(json!({}))
    }

    /// Handles `tools/list`. Expected shape: `{"tools": [...]}`.
    async fn list_tools(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("tools/list"))
    }

    /// Handles `tools/call`. Expected shape: `{"content": [...]}`;
    /// any other success shape is wrapped by the dispatcher into a
    /// single text content item.
    async fn call_tool(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        name: &str,
        _arguments: Value,
    ) -> HandlerResult {
        Err(HandlerError::tool_not_found(name))
    }

    /// Handles `resources/list`.
    async fn list_resources(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("resources/list"))
    }

    /// Handles `resources/read`.
    async fn read_resource(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("resources/read"))
    }

    /// Handles `resources/templates/list`.
    async fn list_resource_templates(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("resources/templates/list"))
    }

    /// Handles `resources/subscribe`.
    async fn subscribe_resource(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("resources/subscribe"))
    }

    /// Handles `resources/unsubscribe`.
    async fn unsubscribe_resource(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("resources/unsubscribe"))
    }

    /// Handles `prompts/list`.
    async fn list_prompts(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("prompts/list"))
    }

    /// Handles `prompts/get`.
    async fn get_prompt(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("prompts/get"))
    }

    /// Handles `completion/complete`.
    async fn complete(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("completion/complete"))
    }

    /// Handles `logging/setLevel`.
    async fn set_log_level(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("logging/setLevel"))
    }

    /// Handles `sampling/createMessage`.
    async fn create_message(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("sampling/createMessage"))
    }

    /// Handles `roots/list`.
    async fn list_roots(
        &self,
        _session_id: &str,
        _request_id: &RequestId,
        _params: Option<Value>,
    ) -> HandlerResult {
        Err(HandlerError::method_not_found("roots/list"))
    }

    /// Handles an inbound notification. Errors are logged by the
    /// dispatcher and never reported to the client.
    async fn notification(
        &self,
        _session_id: &str,
        _method: &str,
        _params: Option<Value>,
        _session: SessionView,
    ) -> Result<(), HandlerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torii_protocol::error_codes;
    use torii_protocol::mcp::initialize::PROTOCOL_VERSION;

    struct Minimal;

    #[async_trait]
    impl McpHandler for Minimal {
        async fn initialize(
            &self,
            _session_id: &str,
            _request_id: &RequestId,
            params: InitializeParams,
        ) -> HandlerResult {
            Ok(json!({
                "protocolVersion": params.protocol_version,
                "capabilities": {},
                "serverInfo": {"name": "minimal", "version": "0"}
            }))
        }
    }

    fn params() -> InitializeParams {
        InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: ClientInfo {
                name: "c".into(),
                version: "0".into(),
            },
        }
    }

    #[tokio::test]
    async fn minimal_handler_initializes() {
        let h = Minimal;
        let r = h
            .initialize("s1", &RequestId::Number(1), params())
            .await
            .expect("initialize");
        assert_eq!(r["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn ping_defaults_to_empty_success() {
        let h = Minimal;
        let r = h.ping("s1", &RequestId::Number(2)).await.expect("ping");
        assert_eq!(r, json!({}));
    }

    #[tokio::test]
    async fn unclaimed_methods_default_to_method_not_found() {
        let h = Minimal;
        let e = h
            .list_tools("s1", &RequestId::Number(3), None)
            .await
            .expect_err("default body");
        assert_eq!(e.code, error_codes::METHOD_NOT_FOUND);
        assert!(e.message.contains("tools/list"));
    }

    #[tokio::test]
    async fn unclaimed_tool_call_defaults_to_tool_not_found() {
        let h = Minimal;
        let e = h
            .call_tool("s1", &RequestId::Number(4), "nope", json!({}))
            .await
            .expect_err("default body");
        assert_eq!(e.code, error_codes::TOOL_NOT_FOUND);
    }

    #[tokio::test]
    async fn notification_defaults_to_noop() {
        let h = Minimal;
        let view = SessionView {
            session_id: "s1".into(),
            transport: "stdio".into(),
            initialized: true,
            protocol_version: Some(PROTOCOL_VERSION.into()),
            client_info: None,
        };
        h.notification("s1", "notifications/cancelled", None, view)
            .await
            .expect("noop");
    }
}
