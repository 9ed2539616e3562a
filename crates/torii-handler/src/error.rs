//! Handler-facing error type, mapping 1:1 onto JSON-RPC error objects.

use serde_json::Value;
use thiserror::Error;

use torii_protocol::error_codes;

/// Result type returned by every handler operation.
pub type HandlerResult = Result<Value, HandlerError>;

/// An error a handler reports back to the dispatcher.
///
/// `code` is a JSON-RPC error code from
/// [`torii_protocol::error_codes`]; the dispatcher wraps the triple
/// into a JSON-RPC error response without interpretation.
#[derive(Debug, Clone, Error)]
#[error("handler error {code}: {message}")]
pub struct HandlerError {
    /// JSON-RPC error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    pub data: Option<Value>,
}

impl HandlerError {
    /// Creates an error with the given code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The operation is not claimed by this handler.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    /// Params failed validation.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    /// Something went wrong inside the handler.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// `tools/call` named a tool this handler does not expose.
    pub fn tool_not_found(name: &str) -> Self {
        Self::new(
            error_codes::TOOL_NOT_FOUND,
            format!("Tool not found: {name}"),
        )
    }
}
