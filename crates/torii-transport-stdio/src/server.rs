//! MCP server loop over framed stdio.
//!
//! The process owns exactly one session: it is minted and registered on
//! startup and starts uninitialized like any SSE session. Inbound
//! frames go to the session manager; everything outbound comes back on
//! the owner channel so frame writes stay serialized and ordered.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use torii_protocol::{error_codes, null_id_error};
use torii_session::{
    Dispatch, Outbound, SessionInput, SessionManager, SessionRecord, SessionRegistry,
    TransportKind,
};

use crate::error::TransportError;
use crate::framing::{FrameReader, FrameWriter};

/// Outbound channel capacity for the stdio session.
const OUTBOUND_CAPACITY: usize = 64;

/// Binds a single MCP session to a framed reader/writer pair.
///
/// Generic over the streams for testability; production wiring passes
/// `tokio::io::stdin()` and `tokio::io::stdout()`.
pub struct StdioServer<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    registry: Arc<SessionRegistry>,
}

impl<R, W> StdioServer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over the given streams.
    pub fn new(reader: R, writer: W, registry: Arc<SessionRegistry>) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            registry,
        }
    }

    /// Runs until stdin reaches EOF, then drains pending responses,
    /// unregisters the session, and returns.
    pub async fn run(self, dispatcher: Arc<dyn Dispatch>) -> Result<(), TransportError> {
        let Self {
            mut reader,
            mut writer,
            registry,
        } = self;

        let session_id = Uuid::new_v4().to_string();
        let (owner, mut outbound_rx) = mpsc::channel::<Outbound>(OUTBOUND_CAPACITY);
        let mailbox =
            SessionManager::spawn(&session_id, registry.clone(), dispatcher, owner.clone());
        let record = SessionRecord::new(&session_id, TransportKind::Stdio, owner, mailbox.clone());
        registry
            .register(record)
            .map_err(|e| TransportError::Registry(e.to_string()))?;

        info!(session_id = %session_id, "MCP server ready on stdio");

        loop {
            tokio::select! {
                frame = reader.read_frame() => match frame? {
                    Some(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                        Ok(message) => {
                            if mailbox.send(SessionInput::Message(message)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "unparseable frame payload");
                            let error = null_id_error(
                                error_codes::PARSE_ERROR,
                                &format!("parse error: {e}"),
                            );
                            // Goes through the manager like any reply;
                            // frame order on stdout stays intact.
                            if mailbox
                                .send(SessionInput::Send(Outbound::message(error)))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                    },
                    None => {
                        info!("stdin closed, shutting down");
                        break;
                    }
                },
                outbound = outbound_rx.recv() => match outbound {
                    Some(out) => write_outbound(&mut writer, out).await?,
                    None => break,
                },
            }
        }

        // Let the manager finish everything already in its mailbox,
        // then tear the session down and drain the tail of responses.
        let _ = mailbox.send(SessionInput::Shutdown).await;
        registry.unregister(&session_id);
        while let Some(out) = outbound_rx.recv().await {
            write_outbound(&mut writer, out).await?;
        }

        Ok(())
    }
}

async fn write_outbound<W>(
    writer: &mut FrameWriter<W>,
    outbound: Outbound,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    // Event names are an SSE concern; stdio frames only the payload.
    let bytes = serde_json::to_vec(&outbound.payload)
        .map_err(|e| TransportError::Write(e.to_string()))?;
    writer.write_frame(&bytes).await
}
