//! Length-prefixed JSON framing, LSP-style:
//!
//! ```text
//! Content-Length: <N>\r\n
//! \r\n
//! <N bytes of UTF-8 JSON>
//! ```
//!
//! The reader is a buffered pull: it accumulates bytes across reads and
//! yields complete payloads. A malformed header never kills the stream;
//! the reader logs it and resynchronizes at the next blank line.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

use crate::error::TransportError;

/// Headers larger than this are treated as garbage and skipped.
const MAX_HEADER_BYTES: usize = 8 * 1024;

const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";

/// Reads length-prefixed JSON payloads from an async byte stream.
///
/// Generic over the reader for testability.
pub struct FrameReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a reader with an empty buffer.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Returns the next complete payload, or `None` on EOF.
    ///
    /// Only I/O failures surface as errors; malformed headers are
    /// logged and skipped by resynchronizing at the next `\r\n\r\n`.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            if let Some(header_end) = find_delimiter(&self.buf) {
                let body_start = header_end + HEADER_DELIMITER.len();
                match parse_content_length(&self.buf[..header_end]) {
                    Ok(length) => {
                        while self.buf.len() < body_start + length {
                            if self.fill().await? == 0 {
                                warn!(
                                    expected = length,
                                    buffered = self.buf.len() - body_start,
                                    "eof inside frame body"
                                );
                                return Ok(None);
                            }
                        }
                        let payload = self.buf[body_start..body_start + length].to_vec();
                        self.buf.drain(..body_start + length);
                        trace!(len = length, "read frame");
                        return Ok(Some(payload));
                    }
                    Err(reason) => {
                        warn!(%reason, "malformed frame header, resynchronizing");
                        self.buf.drain(..body_start);
                        continue;
                    }
                }
            }

            if self.buf.len() > MAX_HEADER_BYTES {
                warn!(len = self.buf.len(), "oversized frame header, dropping buffer");
                // Keep the tail in case a delimiter straddles the cut.
                let tail = self.buf.len() - (HEADER_DELIMITER.len() - 1);
                self.buf.drain(..tail);
            }

            if self.fill().await? == 0 {
                if !self.buf.is_empty() {
                    warn!(len = self.buf.len(), "discarding trailing bytes at eof");
                }
                return Ok(None);
            }
        }
    }

    /// Bytes buffered but not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    async fn fill(&mut self) -> Result<usize, TransportError> {
        self.reader
            .read_buf(&mut self.buf)
            .await
            .map_err(|e| TransportError::Read(e.to_string()))
    }
}

/// Writes length-prefixed payloads to an async byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Emits the header and exact payload bytes, then flushes.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        trace!(len = payload.len(), "writing frame");
        let header = format!("Content-Length: {}\r\n\r\n", payload.len());
        self.writer
            .write_all(header.as_bytes())
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .write_all(payload)
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        Ok(())
    }

    /// Consumes the writer, returning the inner stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
}

/// Extracts the `Content-Length` value from a header block.
///
/// The field name matches case-insensitively; the value must be a
/// plain non-negative decimal integer.
fn parse_content_length(header: &[u8]) -> Result<usize, String> {
    let text =
        std::str::from_utf8(header).map_err(|_| "header is not valid UTF-8".to_string())?;
    for line in text.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("invalid Content-Length value: {value:?}"));
            }
            return value
                .parse::<usize>()
                .map_err(|e| format!("invalid Content-Length value: {e}"));
        }
    }
    Err("missing Content-Length header".to_string())
}
