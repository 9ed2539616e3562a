//! # torii-protocol
//!
//! MCP protocol and JSON-RPC 2.0 type definitions.
//! This crate defines the wire format exchanged between MCP clients
//! and the torii session/dispatch core.

pub mod jsonrpc;
pub mod mcp;

pub use jsonrpc::*;
pub use mcp::methods;
