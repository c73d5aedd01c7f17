//! Connection Handler
//!
//! Owns the socket for exactly one request attempt.

use std::future::Future;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::ServerEndpoint;
use crate::error::{ProcessingError, Result};

/// An open connection to the processing server
///
/// [`Connection::close`] consumes the connection, so it can run at most
/// once. Dropping without closing still releases the socket.
pub struct Connection {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to the endpoint, giving up after `timeout`
    pub async fn open(endpoint: &ServerEndpoint, timeout: Duration) -> Result<Self> {
        let addr = endpoint.addr();
        tracing::debug!("Connecting to {}", addr);

        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        let stream = connect_within(&addr, timeout, connect).await?;

        // Disable Nagle's algorithm; headers are small writes
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Could not set TCP_NODELAY on {}: {}", addr, e);
        }

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or(addr);

        tracing::info!("Connected to {}", peer_addr);
        Ok(Self { stream, peer_addr })
    }

    /// Mutable access to the underlying stream
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Shut down the write half and release the socket
    pub async fn close(mut self) {
        match self.stream.shutdown().await {
            Ok(()) => tracing::debug!("Closed connection to {}", self.peer_addr),
            Err(e) => tracing::debug!(
                "Connection to {} closed with error during shutdown: {}",
                self.peer_addr,
                e
            ),
        }
    }
}

/// Await a connect attempt, mapping the outcome onto connect errors
async fn connect_within<T, F>(addr: &str, timeout: Duration, connect: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            Err(ProcessingError::ConnectRefused {
                addr: addr.to_string(),
            })
        }
        Ok(Err(e)) => Err(ProcessingError::ConnectError {
            addr: addr.to_string(),
            source: e,
        }),
        Err(_) => Err(ProcessingError::ConnectTimeout {
            addr: addr.to_string(),
            timeout,
        }),
    }
}
