//! # torii-config
//!
//! Configuration schema and layered loader (defaults, TOML file,
//! `TORII_`-prefixed environment variables).

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate, ConfigError};
pub use schema::{LoggingConfig, Mode, ServerConfig, ToriiConfig, TransportSelect};
