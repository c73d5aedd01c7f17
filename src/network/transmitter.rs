//! Request transmitter
//!
//! Writes header, params JSON and media type, then streams the source file
//! in bounded chunks. The file is never held in memory as a whole.

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProcessingError, Result};
use crate::protocol::{encode_request_header, ProcessingRequest};

/// Send a request frame and stream the file
///
/// Returns the number of file bytes written. Any file or socket failure
/// aborts the stream with `Transmit`.
pub async fn send_request<W>(
    writer: &mut W,
    request: &ProcessingRequest,
    chunk_size: u32,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let media_type = request.media_type();

    // Size comes from the open handle so the header matches what is streamed
    let file = File::open(request.source_path())
        .await
        .map_err(ProcessingError::Transmit)?;
    let metadata = file.metadata().await.map_err(ProcessingError::Transmit)?;
    if !metadata.is_file() {
        return Err(ProcessingError::Transmit(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", request.source_path().display()),
        )));
    }
    let payload_size = metadata.len();

    let params = request.params_json()?;
    let header = encode_request_header(
        params.len() as u64,
        media_type.len() as u64,
        payload_size,
    )?;

    tracing::debug!(
        "Sending request: json={} media_type={:?} payload={}",
        params.len(),
        media_type,
        payload_size
    );

    writer.write_all(&header).await.map_err(ProcessingError::Transmit)?;
    writer.write_all(&params).await.map_err(ProcessingError::Transmit)?;
    writer
        .write_all(media_type.as_bytes())
        .await
        .map_err(ProcessingError::Transmit)?;

    let sent = stream_file(writer, file, payload_size, chunk_size).await?;
    writer.flush().await.map_err(ProcessingError::Transmit)?;

    tracing::debug!("Upload complete: {} bytes", sent);
    Ok(sent)
}

/// Copy exactly `payload_size` bytes from `file` in chunks of `chunk_size`
async fn stream_file<R, W>(
    writer: &mut W,
    file: R,
    payload_size: u64,
    chunk_size: u32,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let chunk_size = (chunk_size.max(1) as u64).min(payload_size.max(1)) as usize;
    let mut buf = vec![0u8; chunk_size];
    let mut reader = file.take(payload_size);
    let mut sent: u64 = 0;

    loop {
        let n = reader.read(&mut buf).await.map_err(ProcessingError::Transmit)?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(ProcessingError::Transmit)?;
        sent += n as u64;
        tracing::trace!("Sent {}/{} bytes", sent, payload_size);
    }

    if sent != payload_size {
        return Err(ProcessingError::Transmit(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "source file ended after {} of {} declared bytes",
                sent, payload_size
            ),
        )));
    }

    Ok(sent)
}
