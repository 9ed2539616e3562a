//! Handles the `initialize` MCP method.

use serde_json::{json, Value};
use tracing::{debug, warn};

use torii_protocol::error_codes;
use torii_protocol::mcp::initialize::{InitializeParams, ServerInfo};
use torii_protocol::{JsonRpcResponse, RequestId};
use torii_session::{Outbound, RecordPatch, SessionRecord, TransportKind};

use crate::dispatcher::{
    error_out, guarded, handler_error_out, success_out, to_value_lossy, Dispatcher,
};

/// Validates the protocol version, invokes the handler, and commits the
/// negotiated fields to the session record in one atomic patch.
///
/// A repeated `initialize` on an already-initialized session replays
/// the stored result without mutating anything; the replay travels as
/// an unnamed message so the named `InitializeResult` SSE event stays
/// exactly-once per session.
pub(crate) async fn handle_initialize(
    dispatcher: &Dispatcher,
    record: &SessionRecord,
    id: RequestId,
    params: Option<Value>,
) -> Outbound {
    if record.initialized {
        debug!(session_id = %record.session_id, "repeated initialize, replaying result");
        let result = json!({
            "protocolVersion": record.protocol_version,
            "capabilities": record.capabilities.clone().unwrap_or_else(|| json!({})),
            "serverInfo": record.server_info,
        });
        return success_out(id, result);
    }

    let requested = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let requested = match requested {
        Some(version) => version.to_string(),
        None => {
            return error_out(
                id,
                error_codes::PROTOCOL_VERSION_MISMATCH,
                "Missing protocolVersion parameter",
            );
        }
    };
    if !dispatcher
        .config()
        .supported_versions
        .iter()
        .any(|v| v == &requested)
    {
        return error_out(
            id,
            error_codes::PROTOCOL_VERSION_MISMATCH,
            format!("Unsupported protocol version: {requested}"),
        );
    }

    let parsed = params
        .map(serde_json::from_value::<InitializeParams>)
        .transpose();
    let init_params = match parsed {
        Ok(Some(p)) => p,
        Ok(None) | Err(_) => {
            return error_out(
                id,
                error_codes::INVALID_PARAMS,
                "invalid initialize params",
            );
        }
    };
    let client_info = init_params.client_info.clone();

    let handler = dispatcher.handler().clone();
    let sid = record.session_id.clone();
    let rid = id.clone();
    let result = guarded(async move { handler.initialize(&sid, &rid, init_params).await }).await;

    let result = match result {
        Ok(result) => result,
        Err(e) => return handler_error_out(id, e),
    };

    let negotiated_version = result
        .get("protocolVersion")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(requested);
    let server_info = result
        .get("serverInfo")
        .cloned()
        .and_then(|v| serde_json::from_value::<ServerInfo>(v).ok());
    let patch = RecordPatch {
        initialized: Some(true),
        protocol_version: Some(negotiated_version),
        client_info: Some(client_info),
        server_info,
        capabilities: result.get("capabilities").cloned(),
        ..Default::default()
    };
    if let Err(e) = dispatcher.registry().update(&record.session_id, patch) {
        warn!(session_id = %record.session_id, error = %e, "session vanished during initialize");
        return error_out(
            id,
            error_codes::INTERNAL_ERROR,
            "Session not found",
        );
    }

    let response = to_value_lossy(JsonRpcResponse::success(id, result));
    match record.transport {
        // SSE clients subscribe a dedicated listener for the named event.
        TransportKind::Sse => Outbound::named("InitializeResult", response),
        TransportKind::Stdio => Outbound::message(response),
    }
}
