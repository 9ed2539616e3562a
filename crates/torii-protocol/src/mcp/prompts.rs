//! MCP prompts/* method types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request params for `prompts/get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsGetParams {
    /// Prompt name.
    pub name: String,
    /// Optional template arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// A prompt definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Prompt description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response for `prompts/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsListResult {
    /// Available prompts.
    pub prompts: Vec<PromptDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_get_params_serde() {
        let j = r#"{"name":"summarize","arguments":{"text":"hi"}}"#;
        let p: PromptsGetParams = serde_json::from_str(j).expect("de");
        assert_eq!(p.name, "summarize");
        assert!(p.arguments.is_some());
    }

    #[test]
    fn prompt_definition_serde_roundtrip() {
        let def = PromptDefinition {
            name: "summarize".into(),
            description: Some("Summarize text".into()),
        };
        let s = serde_json::to_string(&def).expect("ser");
        let back: PromptDefinition = serde_json::from_str(&s).expect("de");
        assert_eq!(back.name, "summarize");
    }

    #[test]
    fn prompts_list_result_roundtrip() {
        let r = PromptsListResult {
            prompts: vec![PromptDefinition {
                name: "p".into(),
                description: None,
            }],
        };
        let s = serde_json::to_string(&r).expect("ser");
        let back: PromptsListResult = serde_json::from_str(&s).expect("de");
        assert_eq!(back.prompts.len(), 1);
    }
}
