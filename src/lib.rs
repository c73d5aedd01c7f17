//! # vidpress
//!
//! Client-side protocol engine for a remote media processing server:
//! - Public key exchange before any payload is sent
//! - Framed request with the source file streamed in bounded chunks
//! - Incremental response parsing that tolerates any chunking
//! - One connection per request, always closed before returning
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ProcessingClient::submit                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                              │
//! │             (connect deadline, guaranteed close)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │  Handshake  │ │ Transmitter │ │  Receiver   │
//!   │ (key swap)  │ │  (upload)   │ │ (state m/c) │
//!   └──────┬──────┘ └──────┬──────┘ └──────┬──────┘
//!          │               │               │
//!          └───────────────┼───────────────┘
//!                          ▼
//!                  ┌──────────────┐
//!                  │ Frame Codec  │
//!                  └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod keys;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ProcessingError, Result};
pub use config::{Config, EndpointProvider, JsonConfigFile, ServerEndpoint};
pub use keys::{PemFileKeySource, PublicKeySource, StaticKeySource};
pub use protocol::{ProcessingParams, ProcessingRequest};
pub use network::{ProcessedFile, ProcessingClient};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of vidpress
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
