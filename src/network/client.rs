//! Processing client
//!
//! Runs one request end to end: connect, exchange keys, upload, read the
//! reply. The connection is closed before `submit` returns, on every path.

use bytes::Bytes;

use super::connection::Connection;
use super::handshake::exchange_keys;
use super::receiver::receive_response;
use super::transmitter::send_request;
use crate::config::{Config, EndpointProvider, ServerEndpoint};
use crate::error::Result;
use crate::keys::PublicKeySource;
use crate::protocol::{ProcessedMedia, ProcessingRequest};

/// A successfully processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Name to save under, without extension
    pub file_name: String,

    pub file_extension: String,

    pub file_bytes: Bytes,

    /// The server's PEM public key from the handshake
    pub server_public_key: String,
}

/// Client for the processing server
///
/// Holds no connection state between calls; each `submit` opens and owns
/// its own socket and parser.
pub struct ProcessingClient<E, K> {
    endpoints: E,
    keys: K,
    config: Config,
}

impl<E, K> ProcessingClient<E, K>
where
    E: EndpointProvider,
    K: PublicKeySource,
{
    /// Create a client with default timeouts
    pub fn new(endpoints: E, keys: K) -> Self {
        Self::with_config(endpoints, keys, Config::default())
    }

    pub fn with_config(endpoints: E, keys: K, config: Config) -> Self {
        Self {
            endpoints,
            keys,
            config,
        }
    }

    /// Submit a conversion and wait for the processed file
    pub async fn submit(&self, request: &ProcessingRequest) -> Result<ProcessedFile> {
        let endpoint = self.endpoints.endpoint()?;
        let local_key = self.keys.public_key_pem()?;

        tracing::info!(
            "Submitting {} (action {}) to {}",
            request.source_path().display(),
            request.params().action_code() as u8,
            endpoint.addr()
        );

        let mut connection = Connection::open(&endpoint, self.config.connect_timeout).await?;
        let result = self
            .exchange(&mut connection, &endpoint, request, &local_key)
            .await;
        connection.close().await;

        let (server_public_key, media) = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Request for {} failed: {}", request.source_path().display(), e);
                return Err(e);
            }
        };

        tracing::info!(
            "Received {} bytes of .{}",
            media.data.len(),
            media.file_extension
        );

        Ok(ProcessedFile {
            file_name: request.result_file_name(),
            file_extension: media.file_extension,
            file_bytes: media.data,
            server_public_key,
        })
    }

    /// Handshake, transmit and receive over an open connection
    async fn exchange(
        &self,
        connection: &mut Connection,
        endpoint: &ServerEndpoint,
        request: &ProcessingRequest,
        local_key: &str,
    ) -> Result<(String, ProcessedMedia)> {
        let stream = connection.stream_mut();

        let handshake =
            exchange_keys(&mut *stream, local_key, self.config.handshake_timeout).await?;
        send_request(&mut *stream, request, endpoint.stream_chunk_size).await?;
        let media =
            receive_response(stream, handshake.leftover, self.config.receive_buffer_size).await?;

        Ok((handshake.server_public_key, media))
    }
}
