//! Protocol Module
//!
//! Defines the wire protocol between the client and the processing server.
//! Everything here is pure: no sockets, no files.
//!
//! ## Exchange
//! ```text
//! client                                   server
//!   │── Len (4) + client PEM key ──────────▶ │
//!   │ ◀────────── Len (4) + server PEM key ──│
//!   │── Request header (8) ────────────────▶ │
//!   │── Params JSON ───────────────────────▶ │
//!   │── Media type ────────────────────────▶ │
//!   │── File bytes ────────────────────────▶ │
//!   │ ◀──────────── Status (1) + Len (4) ────│
//!   │ ◀──────── Error text | Metadata JSON ──│
//!   │ ◀──────────── File bytes (success) ────│
//! ```
//!
//! ### Status Codes
//! - 0x00: ERROR - Payload: UTF-8 message
//! - other: OK   - Payload: `{"file_extension": .., "file_size": ..}`, then
//!   `file_size` raw bytes

mod codec;
mod handshake;
mod params;
mod response;

pub use codec::{
    decode_request_header, decode_response_header, encode_key_frame, encode_request_header,
    encode_response_header, RequestHeader, ResponseHeader, KEY_FRAME_PREFIX_SIZE,
    MAX_JSON_SIZE, MAX_MEDIA_TYPE_SIZE, MAX_PAYLOAD_SIZE, REQUEST_HEADER_SIZE,
    RESPONSE_HEADER_SIZE, STATUS_ERROR,
};
pub use handshake::{KeyFrameBuffer, MAX_SERVER_KEY_SIZE};
pub use params::{ActionCode, ProcessingParams, ProcessingRequest};
pub use response::{ProcessedMedia, ReceiveProgress, ResponseMetadata, ResponseReceiver};
