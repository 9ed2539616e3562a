//! Configuration loader (file + env merge) and validation.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use thiserror::Error;

use crate::schema::ToriiConfig;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load or merge configuration.
    #[error("configuration error: {0}")]
    Load(String),
    /// The merged configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration by merging layers:
/// 1. Default values
/// 2. Config file (if exists)
/// 3. Environment variables (`TORII_` prefix, `__` for nesting,
///    e.g. `TORII_SERVER__BIND_PORT=9000`)
pub fn load_config(config_path: Option<&str>) -> Result<ToriiConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ToriiConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("TORII_").split("__"));

    let config: ToriiConfig = figment
        .extract()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Validates a configuration, including one adjusted after loading
/// (e.g. by CLI flag overrides).
pub fn validate(config: &ToriiConfig) -> Result<(), ConfigError> {
    let prefix = &config.server.path_prefix;
    if !prefix.is_empty() {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "path_prefix must start with '/': {prefix:?}"
            )));
        }
        if prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "path_prefix must not end with '/': {prefix:?}"
            )));
        }
    }
    if config.server.supported_versions.is_empty() {
        return Err(ConfigError::Invalid(
            "supported_versions must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Mode, TransportSelect};

    #[test]
    fn load_config_no_path_succeeds() {
        let config = load_config(None);
        assert!(config.is_ok(), "default config should load without error");
    }

    #[test]
    fn load_config_default_values() {
        let config = load_config(None).expect("should load");
        assert_eq!(config.server.bind_host, "127.0.0.1");
        assert_eq!(config.server.bind_port, 8765);
        assert_eq!(config.server.path_prefix, "");
        assert_eq!(config.server.mode, Mode::SseOnly);
        assert_eq!(config.server.transport, TransportSelect::Sse);
        assert_eq!(config.server.supported_versions, vec!["2024-11-05"]);
        assert_eq!(config.server.sse_idle_timeout_secs, 300);
        assert!(!config.server.tools_register_enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn load_config_nonexistent_file_falls_back_to_defaults() {
        // figment::Toml::file ignores missing files (optional by default)
        let config = load_config(Some("/nonexistent/path/torii.toml"));
        assert!(
            config.is_ok(),
            "missing config file should fall back to defaults"
        );
    }

    #[test]
    fn idle_timeout_returns_duration() {
        let config = load_config(None).expect("should load");
        assert_eq!(config.server.sse_idle_timeout().as_secs(), 300);
    }

    #[test]
    fn prefix_without_leading_slash_rejected() {
        let mut config = ToriiConfig::default();
        config.server.path_prefix = "mcp".to_string();
        let err = validate(&config).expect_err("invalid prefix");
        assert!(err.to_string().contains("start with"));
    }

    #[test]
    fn prefix_with_trailing_slash_rejected() {
        let mut config = ToriiConfig::default();
        config.server.path_prefix = "/mcp/".to_string();
        let err = validate(&config).expect_err("invalid prefix");
        assert!(err.to_string().contains("end with"));
    }

    #[test]
    fn empty_supported_versions_rejected() {
        let mut config = ToriiConfig::default();
        config.server.supported_versions.clear();
        let err = validate(&config).expect_err("invalid versions");
        assert!(err.to_string().contains("supported_versions"));
    }

    #[test]
    fn mode_gates_health_routes() {
        assert!(!Mode::SseOnly.exposes_health());
        assert!(Mode::Debug.exposes_health());
        assert!(Mode::Inspect.exposes_health());
    }
}
