//! MCP completion/complete method types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request params for `completion/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteParams {
    /// Reference to the prompt or resource being completed.
    #[serde(rename = "ref")]
    pub reference: Value,
    /// The argument under completion.
    pub argument: CompleteArgument,
}

/// The argument under completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteArgument {
    /// Argument name.
    pub name: String,
    /// Partial value typed so far.
    pub value: String,
}

/// Response for `completion/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteResult {
    /// Completion values.
    pub completion: CompletionValues,
}

/// Completion values and pagination info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionValues {
    /// Candidate values.
    pub values: Vec<String>,
    /// Total number of candidates, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Whether more candidates exist beyond `values`.
    #[serde(rename = "hasMore", default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}
