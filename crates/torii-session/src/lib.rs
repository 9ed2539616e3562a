//! # torii-session
//!
//! Per-client session state for the MCP runtime: the process-wide
//! [`SessionRegistry`] with owner liveness monitoring, the
//! [`SessionRecord`] it stores, and the [`SessionManager`] actor that
//! serializes a session's inbound dispatch and outbound writes.
//!
//! The dispatcher is reached through the [`Dispatch`] port so this
//! crate stays independent of protocol routing.

pub mod manager;
pub mod record;
pub mod registry;

pub use manager::{Dispatch, Outbound, SessionInput, SessionManager};
pub use record::{RecordPatch, SessionRecord, TransportKind};
pub use registry::{RegistryError, SessionRegistry};
