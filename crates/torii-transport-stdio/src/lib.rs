//! # torii-transport-stdio
//!
//! LSP-style length-prefixed framing over stdin/stdout and the server
//! loop binding the process's single MCP session.
//!
//! Stdout belongs exclusively to the frame writer once communication
//! begins; logging must go to stderr or a file.

pub mod error;
pub mod framing;
pub mod server;

pub use error::TransportError;
pub use framing::{FrameReader, FrameWriter};
pub use server::StdioServer;
