//! Response receiver
//!
//! Rebuilds a framed server reply from chunks of any size. Chunk
//! boundaries carry no meaning; every transition is decided by comparing
//! buffered byte counts with the sizes declared on the wire.
//!
//! ```text
//! AwaitingHeader ──status 0x00──▶ AwaitingErrorBody ──▶ Resolved (ServerReported)
//!        │
//!        └──status != 0x00──▶ AwaitingMetadata ──▶ AwaitingFileBody ──▶ Resolved (media)
//! ```
//!
//! There are no backward transitions. Bytes past `file_size` are ignored.

use bytes::{Buf, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::codec::{decode_response_header, RESPONSE_HEADER_SIZE};
use crate::error::{ProcessingError, Result};

/// Upper bound on the body capacity reserved up front
const MAX_BODY_PREALLOC: u64 = 8 * 1024 * 1024;

/// Metadata segment of a successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub file_extension: String,
    pub file_size: u64,
}

/// Processed media returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMedia {
    pub file_extension: String,
    pub data: Bytes,
}

/// Outcome of feeding a chunk
#[derive(Debug, PartialEq, Eq)]
pub enum ReceiveProgress {
    /// More bytes are required
    NeedMore,

    /// The response completed with this chunk
    Complete(ProcessedMedia),

    /// The response had already resolved; the chunk was ignored
    Resolved,
}

#[derive(Debug, Clone)]
enum State {
    AwaitingHeader,
    AwaitingErrorBody { len: u32 },
    AwaitingMetadata { len: u32 },
    AwaitingFileBody { file_extension: String, file_size: u64 },
    Resolved,
}

/// Incremental parser for one server response
///
/// One instance per connection attempt; discard it once it resolves.
#[derive(Debug)]
pub struct ResponseReceiver {
    /// Bytes not yet assigned to a field
    buffer: BytesMut,

    /// File body collected so far
    body: BytesMut,

    state: State,

    /// Total bytes fed, including any ignored trailing bytes
    bytes_received: u64,
}

impl ResponseReceiver {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(RESPONSE_HEADER_SIZE + 256),
            body: BytesMut::new(),
            state: State::AwaitingHeader,
            bytes_received: 0,
        }
    }

    /// Feed the next chunk from the socket
    ///
    /// A status `0x00` reply resolves as `Err(ServerReported)`. Any error
    /// returned here is terminal.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<ReceiveProgress> {
        self.bytes_received += chunk.len() as u64;

        match self.state {
            State::Resolved => return Ok(ReceiveProgress::Resolved),
            State::AwaitingFileBody { .. } => self.absorb_body(chunk),
            _ => self.buffer.extend_from_slice(chunk),
        }

        match self.advance() {
            Ok(progress) => Ok(progress),
            Err(e) => {
                self.resolve();
                Err(e)
            }
        }
    }

    /// Run transitions until the buffered bytes are exhausted
    fn advance(&mut self) -> Result<ReceiveProgress> {
        loop {
            match &self.state {
                State::AwaitingHeader => {
                    let header = match decode_response_header(&self.buffer) {
                        Ok(header) => header,
                        Err(ProcessingError::IncompleteHeader { .. }) => {
                            return Ok(ReceiveProgress::NeedMore)
                        }
                        Err(e) => return Err(e),
                    };
                    self.buffer.advance(RESPONSE_HEADER_SIZE);

                    tracing::trace!(
                        "Response header: status=0x{:02x} payload={}",
                        header.status,
                        header.payload_size
                    );

                    self.state = if header.is_error() {
                        State::AwaitingErrorBody {
                            len: header.payload_size,
                        }
                    } else {
                        State::AwaitingMetadata {
                            len: header.payload_size,
                        }
                    };
                }

                State::AwaitingErrorBody { len } => {
                    let len = *len as usize;
                    if self.buffer.len() < len {
                        return Ok(ReceiveProgress::NeedMore);
                    }
                    let text = self.buffer.split_to(len);
                    let message = String::from_utf8_lossy(&text).into_owned();
                    self.resolve();
                    return Err(ProcessingError::ServerReported(message));
                }

                State::AwaitingMetadata { len } => {
                    let len = *len as usize;
                    if self.buffer.len() < len {
                        return Ok(ReceiveProgress::NeedMore);
                    }
                    let raw = self.buffer.split_to(len);
                    let metadata: ResponseMetadata = serde_json::from_slice(&raw)
                        .map_err(|e| ProcessingError::MalformedMetadata(e.to_string()))?;

                    tracing::debug!(
                        "Response metadata: extension={} size={}",
                        metadata.file_extension,
                        metadata.file_size
                    );

                    self.body =
                        BytesMut::with_capacity(metadata.file_size.min(MAX_BODY_PREALLOC) as usize);
                    self.state = State::AwaitingFileBody {
                        file_extension: metadata.file_extension,
                        file_size: metadata.file_size,
                    };

                    // Whatever followed the metadata is the start of the body
                    let rest = self.buffer.split();
                    self.absorb_body(&rest);
                }

                State::AwaitingFileBody {
                    file_extension,
                    file_size,
                } => {
                    if (self.body.len() as u64) < *file_size {
                        return Ok(ReceiveProgress::NeedMore);
                    }
                    let media = ProcessedMedia {
                        file_extension: file_extension.clone(),
                        data: self.body.split().freeze(),
                    };
                    self.resolve();
                    return Ok(ReceiveProgress::Complete(media));
                }

                State::Resolved => return Ok(ReceiveProgress::Resolved),
            }
        }
    }

    /// Append body bytes, dropping anything past the declared size
    fn absorb_body(&mut self, data: &[u8]) {
        if let State::AwaitingFileBody { file_size, .. } = self.state {
            let remaining = file_size.saturating_sub(self.body.len() as u64);
            let take = remaining.min(data.len() as u64) as usize;
            self.body.extend_from_slice(&data[..take]);
        }
    }

    fn resolve(&mut self) {
        self.state = State::Resolved;
        self.buffer.clear();
    }

    /// Error describing a stream that ended in the current state
    pub fn premature_close(&self) -> ProcessingError {
        let (received, expected) = match &self.state {
            State::AwaitingHeader => (self.buffer.len() as u64, RESPONSE_HEADER_SIZE as u64),
            State::AwaitingErrorBody { len } | State::AwaitingMetadata { len } => {
                (self.buffer.len() as u64, *len as u64)
            }
            State::AwaitingFileBody { file_size, .. } => (self.body.len() as u64, *file_size),
            State::Resolved => (0, 0),
        };
        ProcessingError::PrematureClose {
            state: self.state_name(),
            received,
            expected,
        }
    }

    /// Bytes still needed to leave the current state
    pub fn bytes_required(&self) -> u64 {
        match &self.state {
            State::AwaitingHeader => RESPONSE_HEADER_SIZE.saturating_sub(self.buffer.len()) as u64,
            State::AwaitingErrorBody { len } | State::AwaitingMetadata { len } => {
                (*len as u64).saturating_sub(self.buffer.len() as u64)
            }
            State::AwaitingFileBody { file_size, .. } => {
                file_size.saturating_sub(self.body.len() as u64)
            }
            State::Resolved => 0,
        }
    }

    /// Total bytes fed so far
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved)
    }

    /// Current state, for logs and errors
    pub fn state_name(&self) -> &'static str {
        match &self.state {
            State::AwaitingHeader => "awaiting header",
            State::AwaitingErrorBody { .. } => "awaiting error body",
            State::AwaitingMetadata { .. } => "awaiting metadata",
            State::AwaitingFileBody { .. } => "awaiting file body",
            State::Resolved => "resolved",
        }
    }
}

impl Default for ResponseReceiver {
    fn default() -> Self {
        Self::new()
    }
}
