//! Method routing and protocol-state enforcement.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use torii_handler::{HandlerError, McpHandler, SessionView};
use torii_protocol::mcp::initialize::PROTOCOL_VERSION;
use torii_protocol::mcp::{methods, notifications};
use torii_protocol::{
    error_codes, null_id_error, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId,
};
use torii_session::{Dispatch, Outbound, SessionRegistry};

use crate::dispatch::{initialize, tools};

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Protocol versions accepted by `initialize`, in preference order.
    pub supported_versions: Vec<String>,
    /// Whether the `tools/register` extension is exposed.
    pub tools_register_enabled: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            supported_versions: vec![PROTOCOL_VERSION.to_string()],
            tools_register_enabled: false,
        }
    }
}

/// Routes requests and notifications for every session of a server.
///
/// The dispatcher owns all session-state updates: handlers are pure
/// with respect to the registry and only ever see snapshots.
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    handler: Arc<dyn McpHandler>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher bound to a registry and handler.
    pub fn new(
        registry: Arc<SessionRegistry>,
        handler: Arc<dyn McpHandler>,
        config: DispatcherConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            handler,
            config,
        })
    }

    pub(crate) fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub(crate) fn handler(&self) -> &Arc<dyn McpHandler> {
        &self.handler
    }

    pub(crate) fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Dispatches one request and produces the outbound reply.
    ///
    /// The reply always travels the session's outbound channel: stdio
    /// frames it, SSE pushes it as a `data:` chunk (or the named
    /// `InitializeResult` event on first initialize).
    pub async fn handle_request(&self, session_id: &str, request: JsonRpcRequest) -> Outbound {
        let record = match self.registry.lookup(session_id) {
            Ok(record) => record,
            Err(_) => {
                warn!(session_id = %session_id, method = %request.method, "request for unknown session");
                return error_out(
                    request.id,
                    error_codes::INTERNAL_ERROR,
                    "Session not found",
                );
            }
        };

        let requires_init_check = !matches!(
            request.method.as_str(),
            methods::INITIALIZE | notifications::INITIALIZED
        );
        if requires_init_check && !record.initialized {
            debug!(session_id = %session_id, method = %request.method, "request before initialize");
            return error_out(
                request.id,
                error_codes::NOT_INITIALIZED,
                "Session not initialized",
            );
        }

        debug!(session_id = %session_id, method = %request.method, "dispatching request");
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        match method.as_str() {
            methods::INITIALIZE => initialize::handle_initialize(self, &record, id, params).await,
            methods::PING => self.handle_ping(session_id, id).await,
            methods::TOOLS_LIST => tools::handle_tools_list(self, &record, id, params).await,
            methods::TOOLS_CALL => tools::handle_tools_call(self, &record, id, params).await,
            methods::TOOLS_REGISTER => {
                tools::handle_tools_register(self, &record, id, params).await
            }
            methods::RESOURCES_LIST => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.list_resources(&sid, &rid, p).await
                })
                .await
            }
            methods::RESOURCES_READ => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.read_resource(&sid, &rid, p).await
                })
                .await
            }
            methods::RESOURCES_TEMPLATES_LIST => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.list_resource_templates(&sid, &rid, p).await
                })
                .await
            }
            methods::RESOURCES_SUBSCRIBE => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.subscribe_resource(&sid, &rid, p).await
                })
                .await
            }
            methods::RESOURCES_UNSUBSCRIBE => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.unsubscribe_resource(&sid, &rid, p).await
                })
                .await
            }
            methods::PROMPTS_LIST => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.list_prompts(&sid, &rid, p).await
                })
                .await
            }
            methods::PROMPTS_GET => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.get_prompt(&sid, &rid, p).await
                })
                .await
            }
            methods::COMPLETION_COMPLETE => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.complete(&sid, &rid, p).await
                })
                .await
            }
            methods::LOGGING_SET_LEVEL => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.set_log_level(&sid, &rid, p).await
                })
                .await
            }
            methods::SAMPLING_CREATE_MESSAGE => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.create_message(&sid, &rid, p).await
                })
                .await
            }
            methods::ROOTS_LIST => {
                self.passthrough(session_id, id, params, |h, sid, rid, p| async move {
                    h.list_roots(&sid, &rid, p).await
                })
                .await
            }
            other => {
                warn!(session_id = %session_id, method = other, "unknown method");
                error_out(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                )
            }
        }
    }

    /// Dispatches a notification. Never produces outbound traffic.
    ///
    /// The handler call runs on its own task so notification work can
    /// overtake or be overtaken by request processing; errors are
    /// logged, never reported.
    pub async fn handle_notification(&self, session_id: &str, notification: JsonRpcNotification) {
        let record = match self.registry.lookup(session_id) {
            Ok(record) => record,
            Err(_) => {
                trace!(session_id = %session_id, method = %notification.method, "notification for unknown session dropped");
                return;
            }
        };

        let view = SessionView {
            session_id: record.session_id.clone(),
            transport: record.transport.as_str().to_string(),
            initialized: record.initialized,
            protocol_version: record.protocol_version.clone(),
            client_info: record.client_info.clone(),
        };

        let handler = self.handler.clone();
        let sid = session_id.to_string();
        let JsonRpcNotification { method, params, .. } = notification;
        tokio::spawn(async move {
            if let Err(e) = handler.notification(&sid, &method, params, view).await {
                warn!(session_id = %sid, method = %method, error = %e, "notification handler error");
            }
        });
    }

    async fn handle_ping(&self, session_id: &str, id: RequestId) -> Outbound {
        // Result content is discarded either way; ping always answers {}.
        let handler = self.handler.clone();
        let sid = session_id.to_string();
        let rid = id.clone();
        let _ = guarded(async move { handler.ping(&sid, &rid).await }).await;
        success_out(id, json!({}))
    }

    async fn passthrough<F, Fut>(
        &self,
        session_id: &str,
        id: RequestId,
        params: Option<Value>,
        op: F,
    ) -> Outbound
    where
        F: FnOnce(Arc<dyn McpHandler>, String, RequestId, Option<Value>) -> Fut,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let fut = op(
            self.handler.clone(),
            session_id.to_string(),
            id.clone(),
            params,
        );
        match guarded(fut).await {
            Ok(result) => success_out(id, result),
            Err(e) => handler_error_out(id, e),
        }
    }
}

#[async_trait]
impl Dispatch for Dispatcher {
    async fn handle_message(&self, session_id: &str, message: Value) -> Option<Outbound> {
        let id = message.get("id").filter(|v| !v.is_null()).cloned();

        match id {
            Some(raw_id) => match serde_json::from_value::<JsonRpcRequest>(message) {
                Ok(request) => Some(self.handle_request(session_id, request).await),
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "invalid request shape");
                    let payload = match serde_json::from_value::<RequestId>(raw_id) {
                        Ok(id) => to_value_lossy(JsonRpcErrorResponse::error(
                            id,
                            error_codes::INVALID_REQUEST,
                            format!("Invalid request: {e}"),
                        )),
                        Err(_) => null_id_error(
                            error_codes::INVALID_REQUEST,
                            &format!("Invalid request: {e}"),
                        ),
                    };
                    Some(Outbound::message(payload))
                }
            },
            None => {
                match serde_json::from_value::<JsonRpcNotification>(message) {
                    Ok(notification) => {
                        self.handle_notification(session_id, notification).await;
                    }
                    Err(e) => {
                        // No id to answer with; drop after logging.
                        warn!(session_id = %session_id, error = %e, "invalid notification shape dropped");
                    }
                }
                None
            }
        }
    }
}

/// Runs a handler future on its own task so a panic inside the handler
/// is contained and surfaced as an internal JSON-RPC error instead of
/// taking the session actor down.
pub(crate) async fn guarded<F>(fut: F) -> Result<Value, HandlerError>
where
    F: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(result) => result,
        Err(join_error) => {
            warn!(error = %join_error, "handler task failed");
            Err(
                HandlerError::new(error_codes::INTERNAL_ERROR, "Internal error: handler failed")
                    .with_data(json!({"reason": join_error.to_string()})),
            )
        }
    }
}

/// Builds an unnamed outbound success response.
pub(crate) fn success_out(id: RequestId, result: Value) -> Outbound {
    Outbound::message(to_value_lossy(JsonRpcResponse::success(id, result)))
}

/// Builds an unnamed outbound error response.
pub(crate) fn error_out(id: RequestId, code: i32, message: impl Into<String>) -> Outbound {
    Outbound::message(to_value_lossy(JsonRpcErrorResponse::error(
        id, code, message,
    )))
}

/// Wraps a [`HandlerError`] into an outbound error response.
pub(crate) fn handler_error_out(id: RequestId, e: HandlerError) -> Outbound {
    let response = match e.data {
        Some(data) => JsonRpcErrorResponse::error_with_data(id, e.code, e.message, data),
        None => JsonRpcErrorResponse::error(id, e.code, e.message),
    };
    Outbound::message(to_value_lossy(response))
}

/// Serializes a response struct; the types involved cannot fail to
/// serialize, but the fallback keeps the path total.
pub(crate) fn to_value_lossy<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        null_id_error(
            error_codes::INTERNAL_ERROR,
            &format!("response serialization failed: {e}"),
        )
    })
}
