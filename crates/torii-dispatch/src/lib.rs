//! # torii-dispatch
//!
//! The protocol core: validates session state, routes JSON-RPC methods
//! to the bound [`torii_handler::McpHandler`], formats responses and
//! errors, and decides the delivery shape per transport. One
//! [`Dispatcher`] serves every session of a server instance.

mod dispatch;
pub mod dispatcher;

pub use dispatcher::{Dispatcher, DispatcherConfig};
