//! Process-wide session registry with owner liveness monitoring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::record::{RecordPatch, SessionRecord};

/// Errors returned by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A session with this id is already live.
    #[error("session already registered: {id}")]
    AlreadyRegistered { id: String },
    /// No live session has this id.
    #[error("session not found: {id}")]
    NotFound { id: String },
}

/// Maps `session_id` to its [`SessionRecord`] and monitors each
/// record's owner endpoint.
///
/// This is the single serialization point for session-state mutation:
/// every operation takes the internal lock, and the lock is never held
/// across an await, so operations appear atomic to concurrent callers.
/// When a session's owner closes (stream dropped, stdout writer gone),
/// the monitor task removes the record; that is the only automatic
/// removal path — ordinary dispatch never deletes sessions.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    monitors: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
            monitors: Mutex::new(HashMap::new()),
        })
    }

    /// Registers a new session and starts monitoring its owner.
    ///
    /// Must run inside a tokio runtime (the monitor is a spawned task).
    pub fn register(self: &Arc<Self>, record: SessionRecord) -> Result<(), RegistryError> {
        let session_id = record.session_id.clone();
        let owner = record.owner.clone();
        {
            let mut sessions = self.sessions.lock().expect("registry lock poisoned");
            if sessions.contains_key(&session_id) {
                return Err(RegistryError::AlreadyRegistered { id: session_id });
            }
            sessions.insert(session_id.clone(), record);
        }

        let registry = Arc::downgrade(self);
        let monitored_id = session_id.clone();
        let monitor = tokio::spawn(async move {
            owner.closed().await;
            debug!(session_id = %monitored_id, "session owner closed");
            if let Some(registry) = registry.upgrade() {
                registry.unregister(&monitored_id);
            }
        });
        self.monitors
            .lock()
            .expect("registry lock poisoned")
            .insert(session_id.clone(), monitor);

        debug!(session_id = %session_id, "session registered");
        Ok(())
    }

    /// Removes a session and cancels its monitor. Idempotent.
    pub fn unregister(&self, session_id: &str) {
        let removed = self
            .sessions
            .lock()
            .expect("registry lock poisoned")
            .remove(session_id);
        if let Some(monitor) = self
            .monitors
            .lock()
            .expect("registry lock poisoned")
            .remove(session_id)
        {
            monitor.abort();
        }
        if removed.is_some() {
            debug!(session_id = %session_id, "session unregistered");
        }
    }

    /// Returns a snapshot of the session record.
    pub fn lookup(&self, session_id: &str) -> Result<SessionRecord, RegistryError> {
        self.sessions
            .lock()
            .expect("registry lock poisoned")
            .get(session_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                id: session_id.to_string(),
            })
    }

    /// Merges `patch` into the record, last-writer-wins per field,
    /// atomically relative to other registry operations.
    pub fn update(&self, session_id: &str, patch: RecordPatch) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().expect("registry lock poisoned");
        match sessions.get_mut(session_id) {
            Some(record) => {
                patch.apply(record);
                Ok(())
            }
            None => {
                warn!(session_id = %session_id, "update on unknown session");
                Err(RegistryError::NotFound {
                    id: session_id.to_string(),
                })
            }
        }
    }

    /// Snapshot of all live sessions.
    pub fn list(&self) -> HashMap<String, SessionRecord> {
        self.sessions
            .lock()
            .expect("registry lock poisoned")
            .clone()
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.lock().expect("registry lock poisoned").len()
    }
}
