//! MCP logging/* method types.

use serde::{Deserialize, Serialize};

/// Log severity levels recognized by `logging/setLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Request params for `logging/setLevel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLevelParams {
    /// Minimum level the client wants to receive.
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_level_params_serde() {
        let p: SetLevelParams = serde_json::from_str(r#"{"level":"warning"}"#).expect("de");
        assert_eq!(p.level, LogLevel::Warning);
    }

    #[test]
    fn log_level_serializes_lowercase() {
        let s = serde_json::to_string(&LogLevel::Debug).expect("ser");
        assert_eq!(s, "\"debug\"");
    }
}
