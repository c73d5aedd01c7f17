//! Response reading
//!
//! Pumps socket reads into a [`ResponseReceiver`] until it resolves.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProcessingError, Result};
use crate::protocol::{ProcessedMedia, ReceiveProgress, ResponseReceiver};

/// Read the server's reply
///
/// `leftover` holds bytes that were already read from the socket (for
/// instance past the handshake frame) and is parsed first.
pub async fn receive_response<R>(
    reader: &mut R,
    leftover: Bytes,
    buffer_size: usize,
) -> Result<ProcessedMedia>
where
    R: AsyncRead + Unpin,
{
    let mut receiver = ResponseReceiver::new();

    if !leftover.is_empty() {
        if let ReceiveProgress::Complete(media) = receiver.feed(&leftover)? {
            return Ok(media);
        }
    }

    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(ProcessingError::ReceiveTransport)?;
        if n == 0 {
            tracing::warn!(
                "Server closed the stream while {} ({} bytes received)",
                receiver.state_name(),
                receiver.bytes_received()
            );
            return Err(receiver.premature_close());
        }

        match receiver.feed(&buf[..n])? {
            ReceiveProgress::NeedMore => {
                tracing::trace!(
                    "Received {} bytes, {} still required while {}",
                    n,
                    receiver.bytes_required(),
                    receiver.state_name()
                );
            }
            ReceiveProgress::Complete(media) => {
                tracing::debug!(
                    "Response complete: {} bytes of .{}",
                    media.data.len(),
                    media.file_extension
                );
                return Ok(media);
            }
            ReceiveProgress::Resolved => return Err(receiver.premature_close()),
        }
    }
}
