//! Configuration for vidpress
//!
//! Two layers:
//! - [`ServerEndpoint`]: where the processing server lives and how large the
//!   upload chunks are. Supplied by an [`EndpointProvider`] once per request.
//! - [`Config`]: client-side timing and buffering knobs with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProcessingError, Result};

/// Default connect deadline
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default key exchange read deadline
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default size of a single socket read while receiving the response
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 64 * 1024;

// =============================================================================
// Server Endpoint
// =============================================================================

/// Address of the processing server plus the upload chunk size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,

    /// Upper bound on bytes read from disk and written per upload chunk
    pub stream_chunk_size: u32,
}

impl ServerEndpoint {
    /// Create an endpoint, rejecting an empty host or a zero chunk size
    pub fn new(host: impl Into<String>, port: u16, stream_chunk_size: u32) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ProcessingError::Config("server address is empty".to_string()));
        }
        if stream_chunk_size == 0 {
            return Err(ProcessingError::Config(
                "stream rate must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            host,
            port,
            stream_chunk_size,
        })
    }

    /// `host:port` form used for connecting and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Supplies the server endpoint for a request attempt
pub trait EndpointProvider {
    fn endpoint(&self) -> Result<ServerEndpoint>;
}

impl EndpointProvider for ServerEndpoint {
    fn endpoint(&self) -> Result<ServerEndpoint> {
        Ok(self.clone())
    }
}

/// On-disk layout of the client config document
#[derive(Debug, Deserialize)]
struct EndpointDocument {
    server_address: String,
    server_port: u16,
    stream_rate: u32,
}

/// Endpoint provider backed by a JSON config file
///
/// ```text
/// { "server_address": "127.0.0.1", "server_port": 9001, "stream_rate": 4096 }
/// ```
///
/// The file is re-read on every call so edits apply to the next request.
#[derive(Debug, Clone)]
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse an endpoint from a JSON document
    pub fn parse(text: &str) -> Result<ServerEndpoint> {
        let doc: EndpointDocument = serde_json::from_str(text)
            .map_err(|e| ProcessingError::Config(format!("invalid config document: {}", e)))?;
        ServerEndpoint::new(doc.server_address, doc.server_port, doc.stream_rate)
    }
}

impl EndpointProvider for JsonConfigFile {
    fn endpoint(&self) -> Result<ServerEndpoint> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            ProcessingError::Config(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        Self::parse(&text)
    }
}

// =============================================================================
// Client Config
// =============================================================================

/// Client-side timing and buffering configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Deadline for establishing the TCP connection
    pub connect_timeout: Duration,

    /// Deadline for receiving the server's key frame, measured from the
    /// start of the read
    pub handshake_timeout: Duration,

    /// Size of each socket read while receiving the response
    pub receive_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the connect deadline
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the key exchange deadline
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Set the receive buffer size (clamped to at least one byte)
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.config.receive_buffer_size = size.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_document() {
        let endpoint = JsonConfigFile::parse(
            r#"{"server_address": "127.0.0.1", "server_port": 9001, "stream_rate": 1400}"#,
        )
        .unwrap();

        assert_eq!(endpoint.host, "127.0.0.1");
        assert_eq!(endpoint.port, 9001);
        assert_eq!(endpoint.stream_chunk_size, 1400);
        assert_eq!(endpoint.addr(), "127.0.0.1:9001");
    }

    #[test]
    fn test_parse_ignores_server_only_keys() {
        let endpoint = JsonConfigFile::parse(
            r#"{"server_address": "localhost", "server_port": 80, "stream_rate": 10,
                "max_storage": 1000, "storage_dir": "/storage"}"#,
        )
        .unwrap();
        assert_eq!(endpoint.host, "localhost");
    }

    #[test]
    fn test_zero_stream_rate_rejected() {
        let result = JsonConfigFile::parse(
            r#"{"server_address": "127.0.0.1", "server_port": 9001, "stream_rate": 0}"#,
        );
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = JsonConfigFile::parse(r#"{"server_address": "127.0.0.1"}"#);
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder().build();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.receive_buffer_size, DEFAULT_RECEIVE_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_clamps_buffer_size() {
        let config = Config::builder().receive_buffer_size(0).build();
        assert_eq!(config.receive_buffer_size, 1);
    }
}
