//! Network Module
//!
//! Async TCP client for the processing server.
//!
//! ## Flow
//! - `Connection::open` with a connect deadline
//! - `exchange_keys` with a read deadline
//! - `send_request` streams the source file
//! - `receive_response` drives the response parser
//! - `Connection::close` on every exit path

mod client;
mod connection;
mod handshake;
mod receiver;
mod transmitter;

pub use client::{ProcessedFile, ProcessingClient};
pub use connection::Connection;
pub use handshake::{exchange_keys, HandshakeOutcome};
pub use receiver::receive_response;
pub use transmitter::send_request;
