//! Key frame accumulator
//!
//! Reassembles the server's length-prefixed public key from arbitrarily
//! sized reads:
//! - `AwaitingLength`: need 4 bytes for the prefix
//! - `AwaitingKey`: prefix known, need `len` more bytes
//! - `Complete`: key extracted, later bytes are kept for the response parser

use bytes::{Bytes, BytesMut};

use super::codec::KEY_FRAME_PREFIX_SIZE;
use crate::error::{ProcessingError, Result};

/// Largest server key accepted (a 2048-bit PEM key is well under 1 KiB)
pub const MAX_SERVER_KEY_SIZE: u32 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingLength,
    AwaitingKey { len: u32 },
    Complete,
}

/// Buffer for the server's key frame
#[derive(Debug)]
pub struct KeyFrameBuffer {
    buffer: BytesMut,
    state: State,
}

impl KeyFrameBuffer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            state: State::AwaitingLength,
        }
    }

    /// Push a chunk and return the key once the frame is complete
    ///
    /// Returns `Ok(None)` while more bytes are needed. The key is returned
    /// exactly once; bytes past the frame stay buffered, see
    /// [`KeyFrameBuffer::take_remaining`].
    pub fn push(&mut self, data: &[u8]) -> Result<Option<String>> {
        self.buffer.extend_from_slice(data);

        if self.state == State::AwaitingLength {
            if self.buffer.len() < KEY_FRAME_PREFIX_SIZE {
                return Ok(None);
            }
            let prefix = self.buffer.split_to(KEY_FRAME_PREFIX_SIZE);
            let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
            if len > MAX_SERVER_KEY_SIZE {
                return Err(invalid_key(format!(
                    "server key frame declares {} bytes (max {})",
                    len, MAX_SERVER_KEY_SIZE
                )));
            }
            self.state = State::AwaitingKey { len };
        }

        if let State::AwaitingKey { len } = self.state {
            let len = len as usize;
            if self.buffer.len() < len {
                return Ok(None);
            }
            let key = self.buffer.split_to(len);
            self.state = State::Complete;

            let key = String::from_utf8(key.to_vec())
                .map_err(|_| invalid_key("server key is not valid UTF-8".to_string()))?;
            return Ok(Some(key));
        }

        Ok(None)
    }

    /// Bytes still needed before the frame can complete
    pub fn bytes_required(&self) -> usize {
        match self.state {
            State::AwaitingLength => KEY_FRAME_PREFIX_SIZE.saturating_sub(self.buffer.len()),
            State::AwaitingKey { len } => (len as usize).saturating_sub(self.buffer.len()),
            State::Complete => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Drain bytes received after the key frame
    pub fn take_remaining(&mut self) -> Bytes {
        if self.is_complete() {
            self.buffer.split().freeze()
        } else {
            Bytes::new()
        }
    }
}

impl Default for KeyFrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_key(message: String) -> ProcessingError {
    ProcessingError::HandshakeTransport(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}
