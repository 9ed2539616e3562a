//! Handles the `tools/*` MCP method family.

use serde_json::{json, Value};
use tracing::debug;

use torii_protocol::error_codes;
use torii_protocol::mcp::tools::{ToolsCallParams, ToolsListResult};
use torii_protocol::RequestId;
use torii_session::{Outbound, RecordPatch, SessionRecord};

use crate::dispatcher::{error_out, guarded, handler_error_out, success_out, Dispatcher};

/// `tools/list`: the handler's tools wrapped in a `ListToolsResult`
/// envelope, followed by any descriptors added via `tools/register`.
pub(crate) async fn handle_tools_list(
    dispatcher: &Dispatcher,
    record: &SessionRecord,
    id: RequestId,
    params: Option<Value>,
) -> Outbound {
    let handler = dispatcher.handler().clone();
    let sid = record.session_id.clone();
    let rid = id.clone();
    let result = guarded(async move { handler.list_tools(&sid, &rid, params).await }).await;

    let result = match result {
        Ok(result) => result,
        Err(e) => return handler_error_out(id, e),
    };

    let mut tools = result
        .get("tools")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut registered: Vec<_> = record.custom_tools.iter().collect();
    registered.sort_by(|a, b| a.0.cmp(b.0));
    tools.extend(registered.into_iter().map(|(_, tool)| tool.clone()));

    let envelope = ToolsListResult {
        tools,
        next_cursor: result
            .get("nextCursor")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    match serde_json::to_value(envelope) {
        Ok(value) => success_out(id, value),
        Err(e) => error_out(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

/// `tools/call`: expects `{content: [...]}` back; any other success
/// shape is wrapped as a single text content item.
pub(crate) async fn handle_tools_call(
    dispatcher: &Dispatcher,
    record: &SessionRecord,
    id: RequestId,
    params: Option<Value>,
) -> Outbound {
    let call_params = match params.map(serde_json::from_value::<ToolsCallParams>) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            return error_out(
                id,
                error_codes::INVALID_PARAMS,
                format!("invalid tools/call params: {e}"),
            );
        }
        None => {
            return error_out(
                id,
                error_codes::INVALID_PARAMS,
                "tools/call requires params",
            );
        }
    };

    debug!(session_id = %record.session_id, tool = %call_params.name, "calling tool");

    let handler = dispatcher.handler().clone();
    let sid = record.session_id.clone();
    let rid = id.clone();
    let name = call_params.name;
    let arguments = call_params.arguments;
    let result =
        guarded(async move { handler.call_tool(&sid, &rid, &name, arguments).await }).await;

    match result {
        Ok(result) => {
            let shaped = if result.get("content").is_some_and(Value::is_array) {
                result
            } else {
                json!({"content": [{"type": "text", "text": result.to_string()}]})
            };
            success_out(id, shaped)
        }
        Err(e) => handler_error_out(id, e),
    }
}

/// `tools/register`: local extension merging a tool descriptor into the
/// session's `custom_tools`. Gated behind a capability flag; when the
/// flag is off the method does not exist.
pub(crate) async fn handle_tools_register(
    dispatcher: &Dispatcher,
    record: &SessionRecord,
    id: RequestId,
    params: Option<Value>,
) -> Outbound {
    if !dispatcher.config().tools_register_enabled {
        return error_out(
            id,
            error_codes::METHOD_NOT_FOUND,
            "Method not found: tools/register",
        );
    }

    let tool = match params {
        Some(tool) if tool.is_object() => tool,
        _ => {
            return error_out(
                id,
                error_codes::INVALID_PARAMS,
                "Invalid tool definition: expected an object",
            );
        }
    };
    let name = match tool.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return error_out(
                id,
                error_codes::INVALID_PARAMS,
                "Invalid tool definition: missing name",
            );
        }
    };

    let mut custom_tools = record.custom_tools.clone();
    custom_tools.insert(name.clone(), tool);
    let patch = RecordPatch {
        custom_tools: Some(custom_tools),
        ..Default::default()
    };
    if dispatcher.registry().update(&record.session_id, patch).is_err() {
        return error_out(id, error_codes::INTERNAL_ERROR, "Session not found");
    }

    debug!(session_id = %record.session_id, tool = %name, "tool registered");
    success_out(id, json!({}))
}
