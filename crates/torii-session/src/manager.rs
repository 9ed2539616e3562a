//! One manager actor per live session.
//!
//! The manager owns the session's inbound mailbox and its outbound
//! channel: messages are dispatched strictly in arrival order and
//! responses leave on the owner channel in the same order, which is
//! what gives each session its per-connection ordering guarantee.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::registry::SessionRegistry;

/// Inbound mailbox capacity per session.
const MAILBOX_CAPACITY: usize = 64;

/// A message leaving the session toward the client.
///
/// `event` is the SSE event name for named chunks; the stdio writer
/// ignores it and frames only the payload. One tagged variant serves
/// both wire models so there is a single delivery path to drift.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// SSE event name, when the chunk is named.
    pub event: Option<String>,
    /// The JSON-RPC payload.
    pub payload: Value,
}

impl Outbound {
    /// An unnamed outbound message (`data:` chunk / plain frame).
    pub fn message(payload: Value) -> Self {
        Self {
            event: None,
            payload,
        }
    }

    /// A named outbound event (SSE only; stdio frames the payload).
    pub fn named(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: Some(event.into()),
            payload,
        }
    }
}

/// Control inputs accepted by a session manager.
#[derive(Debug)]
pub enum SessionInput {
    /// A raw inbound JSON-RPC message from the transport.
    Message(Value),
    /// A server-originated message to deliver outbound.
    Send(Outbound),
    /// Terminate the session.
    Shutdown,
}

/// Port through which the manager drives the protocol dispatcher.
///
/// The dispatcher classifies the raw message (request, notification,
/// invalid shape) and returns what, if anything, must go back out on
/// this session's outbound channel.
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    async fn handle_message(&self, session_id: &str, message: Value) -> Option<Outbound>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerState {
    Opening,
    Ready,
    Terminating,
}

/// The per-session actor. One exists per live session; it is spawned
/// by a transport adapter and lives until shutdown, owner death, or
/// mailbox closure.
pub struct SessionManager {
    session_id: String,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<dyn Dispatch>,
    owner: mpsc::Sender<Outbound>,
    inbox: mpsc::Receiver<SessionInput>,
    state: ManagerState,
}

impl SessionManager {
    /// Spawns the manager task and returns the mailbox handle the
    /// transport stores in the session record.
    pub fn spawn(
        session_id: impl Into<String>,
        registry: Arc<SessionRegistry>,
        dispatcher: Arc<dyn Dispatch>,
        owner: mpsc::Sender<Outbound>,
    ) -> mpsc::Sender<SessionInput> {
        let (mailbox, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let manager = Self {
            session_id: session_id.into(),
            registry,
            dispatcher,
            owner,
            inbox,
            state: ManagerState::Opening,
        };
        tokio::spawn(manager.run());
        mailbox
    }

    async fn run(mut self) {
        self.state = ManagerState::Ready;
        debug!(session_id = %self.session_id, state = ?self.state, "session manager ready");

        while let Some(input) = self.inbox.recv().await {
            match input {
                SessionInput::Message(message) => {
                    trace!(session_id = %self.session_id, "dispatching inbound message");
                    let outbound = self
                        .dispatcher
                        .handle_message(&self.session_id, message)
                        .await;
                    if let Some(outbound) = outbound {
                        if self.owner.send(outbound).await.is_err() {
                            debug!(session_id = %self.session_id, "owner gone, terminating");
                            break;
                        }
                    }
                }
                SessionInput::Send(outbound) => {
                    if self.owner.send(outbound).await.is_err() {
                        debug!(session_id = %self.session_id, "owner gone, terminating");
                        break;
                    }
                }
                SessionInput::Shutdown => {
                    debug!(session_id = %self.session_id, "shutdown requested");
                    break;
                }
            }
        }

        self.state = ManagerState::Terminating;
        // The registry entry must be gone before the actor exits.
        self.registry.unregister(&self.session_id);
        debug!(session_id = %self.session_id, state = ?self.state, "session manager stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{SessionRecord, TransportKind};
    use serde_json::json;

    /// Echoes requests back as unnamed messages; stays silent for
    /// messages without an id, like the real dispatcher does for
    /// notifications.
    struct EchoDispatch;

    #[async_trait]
    impl Dispatch for EchoDispatch {
        async fn handle_message(&self, _session_id: &str, message: Value) -> Option<Outbound> {
            if message.get("id").is_some_and(|v| !v.is_null()) {
                Some(Outbound::message(json!({"echo": message})))
            } else {
                None
            }
        }
    }

    fn spawn_session(
        id: &str,
        registry: &Arc<SessionRegistry>,
    ) -> (mpsc::Sender<SessionInput>, mpsc::Receiver<Outbound>) {
        let (owner, owner_rx) = mpsc::channel(16);
        let mailbox = SessionManager::spawn(
            id,
            registry.clone(),
            Arc::new(EchoDispatch),
            owner.clone(),
        );
        let record = SessionRecord::new(id, TransportKind::Stdio, owner, mailbox.clone());
        registry.register(record).expect("register");
        (mailbox, owner_rx)
    }

    #[tokio::test]
    async fn request_flows_to_outbound() {
        let registry = SessionRegistry::new();
        let (mailbox, mut owner_rx) = spawn_session("s", &registry);

        mailbox
            .send(SessionInput::Message(json!({"id": 1, "method": "ping"})))
            .await
            .expect("send");

        let out = owner_rx.recv().await.expect("outbound");
        assert_eq!(out.payload["echo"]["id"], 1);
    }

    #[tokio::test]
    async fn responses_keep_arrival_order() {
        let registry = SessionRegistry::new();
        let (mailbox, mut owner_rx) = spawn_session("s", &registry);

        for i in 0..5 {
            mailbox
                .send(SessionInput::Message(json!({"id": i, "method": "ping"})))
                .await
                .expect("send");
        }
        for i in 0..5 {
            let out = owner_rx.recv().await.expect("outbound");
            assert_eq!(out.payload["echo"]["id"], i);
        }
    }

    #[tokio::test]
    async fn notifications_produce_no_outbound() {
        let registry = SessionRegistry::new();
        let (mailbox, mut owner_rx) = spawn_session("s", &registry);

        mailbox
            .send(SessionInput::Message(
                json!({"method": "notifications/initialized"}),
            ))
            .await
            .expect("send");
        mailbox
            .send(SessionInput::Message(json!({"id": 9, "method": "ping"})))
            .await
            .expect("send");

        // The only outbound traffic is the response to the request.
        let out = owner_rx.recv().await.expect("outbound");
        assert_eq!(out.payload["echo"]["id"], 9);
    }

    #[tokio::test]
    async fn send_input_forwards_server_messages() {
        let registry = SessionRegistry::new();
        let (mailbox, mut owner_rx) = spawn_session("s", &registry);

        mailbox
            .send(SessionInput::Send(Outbound::named(
                "InitializeResult",
                json!({"ok": true}),
            )))
            .await
            .expect("send");

        let out = owner_rx.recv().await.expect("outbound");
        assert_eq!(out.event.as_deref(), Some("InitializeResult"));
    }

    #[tokio::test]
    async fn shutdown_unregisters_session() {
        let registry = SessionRegistry::new();
        let (mailbox, _owner_rx) = spawn_session("s", &registry);

        mailbox
            .send(SessionInput::Shutdown)
            .await
            .expect("shutdown");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(1);
        while registry.lookup("s").is_ok() {
            assert!(
                std::time::Instant::now() < deadline,
                "shutdown did not unregister in time"
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}
