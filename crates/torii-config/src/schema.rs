//! Configuration schema types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level torii configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToriiConfig {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which transport the server binds on startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSelect {
    /// SSE + HTTP POST (the default).
    #[default]
    Sse,
    /// Length-prefixed frames on stdin/stdout.
    Stdio,
}

/// Which HTTP routes are exposed beyond the MCP pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Only `/sse` and `/rpc/...`.
    #[default]
    SseOnly,
    /// Adds the liveness routes.
    Debug,
    /// Adds the liveness routes.
    Inspect,
}

impl Mode {
    /// Whether `/health` and `/health/ready` are mounted.
    pub fn exposes_health(&self) -> bool {
        matches!(self, Self::Debug | Self::Inspect)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the SSE transport binds.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Port the SSE transport binds.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    /// URL prefix for `/sse` and `/rpc/...`. Empty, or `/`-prefixed
    /// without a trailing `/`.
    #[serde(default)]
    pub path_prefix: String,
    /// Route exposure mode.
    #[serde(default)]
    pub mode: Mode,
    /// Transport started by `torii serve`.
    #[serde(default)]
    pub transport: TransportSelect,
    /// Protocol versions accepted by `initialize`, in preference order.
    #[serde(default = "default_supported_versions")]
    pub supported_versions: Vec<String>,
    /// Seconds of outbound silence before an SSE stream is closed.
    #[serde(default = "default_sse_idle_timeout_secs")]
    pub sse_idle_timeout_secs: u64,
    /// Whether the `tools/register` extension is exposed.
    #[serde(default)]
    pub tools_register_enabled: bool,
}

impl ServerConfig {
    /// Returns the idle timeout as a `Duration`.
    pub fn sse_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.sse_idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            bind_port: default_bind_port(),
            path_prefix: String::new(),
            mode: Mode::default(),
            transport: TransportSelect::default(),
            supported_versions: default_supported_versions(),
            sse_idle_timeout_secs: default_sse_idle_timeout_secs(),
            tools_register_enabled: false,
        }
    }
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}
fn default_bind_port() -> u16 {
    8765
}
fn default_supported_versions() -> Vec<String> {
    vec!["2024-11-05".to_string()]
}
fn default_sse_idle_timeout_secs() -> u64 {
    300
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "torii=trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
