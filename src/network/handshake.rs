//! Key exchange
//!
//! Sends the local public key and waits for the server's, both as
//! length-prefixed frames. The server key is returned as-is; nothing here
//! validates it or encrypts with it.

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProcessingError, Result};
use crate::protocol::{encode_key_frame, KeyFrameBuffer};

const READ_CHUNK_SIZE: usize = 1024;

/// Result of a completed key exchange
#[derive(Debug, Clone)]
pub struct HandshakeOutcome {
    /// The server's PEM public key, verbatim
    pub server_public_key: String,

    /// Bytes that arrived after the key frame; they belong to the response
    pub leftover: Bytes,
}

/// Swap public keys with the server
///
/// `deadline` bounds the wait for the server's frame and starts when the
/// read begins. On timeout the caller must drop the connection.
pub async fn exchange_keys<S>(
    stream: &mut S,
    local_public_key: &str,
    deadline: Duration,
) -> Result<HandshakeOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = encode_key_frame(local_public_key)?;
    stream
        .write_all(&frame)
        .await
        .map_err(ProcessingError::HandshakeTransport)?;
    stream
        .flush()
        .await
        .map_err(ProcessingError::HandshakeTransport)?;

    tracing::debug!("Sent public key ({} bytes), awaiting server key", local_public_key.len());

    let outcome = tokio::time::timeout(deadline, read_server_key(stream))
        .await
        .map_err(|_| ProcessingError::HandshakeTimeout(deadline))??;

    tracing::debug!(
        "Received server key ({} bytes, {} bytes carried over)",
        outcome.server_public_key.len(),
        outcome.leftover.len()
    );
    Ok(outcome)
}

async fn read_server_key<R>(reader: &mut R) -> Result<HandshakeOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut frame = KeyFrameBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(ProcessingError::HandshakeTransport)?;
        if n == 0 {
            return Err(ProcessingError::HandshakeTransport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "server closed the connection with {} key bytes outstanding",
                    frame.bytes_required()
                ),
            )));
        }

        if let Some(server_public_key) = frame.push(&chunk[..n])? {
            return Ok(HandshakeOutcome {
                server_public_key,
                leftover: frame.take_remaining(),
            });
        }
    }
}
