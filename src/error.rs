//! Error types for vidpress
//!
//! Provides a single error type for every phase of a processing request.
//! Any of these aborts the whole request; nothing is retried internally.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using ProcessingError
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Unified error type for a processing request
#[derive(Debug, Error)]
pub enum ProcessingError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Timed out after {timeout:?} connecting to {addr}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("Connection refused by {addr}")]
    ConnectRefused { addr: String },

    #[error("Failed to connect to {addr}: {source}")]
    ConnectError {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Handshake Errors
    // -------------------------------------------------------------------------
    #[error("Key exchange timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("Key exchange failed: {0}")]
    HandshakeTransport(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Transmit Errors
    // -------------------------------------------------------------------------
    #[error("Failed to send request: {0}")]
    Transmit(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Response Errors
    // -------------------------------------------------------------------------
    #[error("Incomplete header: expected {expected} bytes, got {actual}")]
    IncompleteHeader { expected: usize, actual: usize },

    #[error("Malformed response metadata: {0}")]
    MalformedMetadata(String),

    #[error("Connection closed while {state} ({received} of {expected} bytes received)")]
    PrematureClose {
        state: &'static str,
        received: u64,
        expected: u64,
    },

    #[error("Failed to read response: {0}")]
    ReceiveTransport(#[source] std::io::Error),

    #[error("Server error: {0}")]
    ServerReported(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Value {value} does not fit {field} (max {max})")]
    FrameOverflow {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("Key material error: {0}")]
    KeyMaterial(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
