//! Frame codec
//!
//! Pure encoding and decoding of the fixed-width binary headers.
//!
//! ## Wire Format
//!
//! ### Request Header
//! ```text
//! ┌──────────────┬───────────────┬──────────────────────┐
//! │ JSON Len (2) │ Media Len (1) │   Payload Len (5)    │
//! └──────────────┴───────────────┴──────────────────────┘
//! ```
//!
//! ### Response Header
//! ```text
//! ┌──────────┬──────────┐
//! │Status(1) │ Len (4)  │
//! └──────────┴──────────┘
//! ```
//!
//! ### Key Frame
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │       PEM public key        │
//! └──────────┴─────────────────────────────┘
//! ```

use crate::error::{ProcessingError, Result};

/// Request header size: 2 + 1 + 5
pub const REQUEST_HEADER_SIZE: usize = 8;

/// Response header size: 1 byte status + 4 bytes length
pub const RESPONSE_HEADER_SIZE: usize = 5;

/// Key frame length prefix size
pub const KEY_FRAME_PREFIX_SIZE: usize = 4;

/// Largest JSON segment the 16-bit field can describe
pub const MAX_JSON_SIZE: u64 = u16::MAX as u64;

/// Largest media type segment the 8-bit field can describe
pub const MAX_MEDIA_TYPE_SIZE: u64 = u8::MAX as u64;

/// Largest upload the 40-bit field can describe (1 TiB - 1)
pub const MAX_PAYLOAD_SIZE: u64 = (1 << 40) - 1;

/// Largest key the 32-bit prefix can describe
const MAX_KEY_SIZE: u64 = u32::MAX as u64;

/// Response status byte reserved for server-reported errors
pub const STATUS_ERROR: u8 = 0x00;

/// Decoded request header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub json_size: u16,
    pub media_type_size: u8,
    pub payload_size: u64,
}

/// Decoded response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u8,
    pub payload_size: u32,
}

impl ResponseHeader {
    /// Whether the payload carries an error message rather than metadata
    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }
}

fn check_width(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(ProcessingError::FrameOverflow { field, value, max });
    }
    Ok(())
}

// =============================================================================
// Request Header
// =============================================================================

/// Encode the 8-byte request header
///
/// Fails with `FrameOverflow` if any size exceeds its field width.
pub fn encode_request_header(
    json_size: u64,
    media_type_size: u64,
    payload_size: u64,
) -> Result<[u8; REQUEST_HEADER_SIZE]> {
    check_width("json size", json_size, MAX_JSON_SIZE)?;
    check_width("media type size", media_type_size, MAX_MEDIA_TYPE_SIZE)?;
    check_width("payload size", payload_size, MAX_PAYLOAD_SIZE)?;

    let mut header = [0u8; REQUEST_HEADER_SIZE];
    header[0..2].copy_from_slice(&(json_size as u16).to_be_bytes());
    header[2] = media_type_size as u8;
    // Low 5 bytes of the big-endian u64
    header[3..8].copy_from_slice(&payload_size.to_be_bytes()[3..8]);

    Ok(header)
}

/// Decode a request header (server side of the wire, used by test peers)
pub fn decode_request_header(bytes: &[u8]) -> Result<RequestHeader> {
    if bytes.len() < REQUEST_HEADER_SIZE {
        return Err(ProcessingError::IncompleteHeader {
            expected: REQUEST_HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut payload = [0u8; 8];
    payload[3..8].copy_from_slice(&bytes[3..8]);

    Ok(RequestHeader {
        json_size: u16::from_be_bytes([bytes[0], bytes[1]]),
        media_type_size: bytes[2],
        payload_size: u64::from_be_bytes(payload),
    })
}

// =============================================================================
// Response Header
// =============================================================================

/// Encode a 5-byte response header
pub fn encode_response_header(status: u8, payload_size: u32) -> [u8; RESPONSE_HEADER_SIZE] {
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    header[0] = status;
    header[1..5].copy_from_slice(&payload_size.to_be_bytes());
    header
}

/// Decode the response header from the front of `bytes`
///
/// Fails with `IncompleteHeader` when fewer than 5 bytes are present; the
/// caller keeps buffering and tries again.
pub fn decode_response_header(bytes: &[u8]) -> Result<ResponseHeader> {
    if bytes.len() < RESPONSE_HEADER_SIZE {
        return Err(ProcessingError::IncompleteHeader {
            expected: RESPONSE_HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    Ok(ResponseHeader {
        status: bytes[0],
        payload_size: u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]),
    })
}

// =============================================================================
// Key Frame
// =============================================================================

/// Encode a length-prefixed key frame
pub fn encode_key_frame(key: &str) -> Result<Vec<u8>> {
    let len = key.len() as u64;
    check_width("key size", len, MAX_KEY_SIZE)?;

    let mut frame = Vec::with_capacity(KEY_FRAME_PREFIX_SIZE + key.len());
    frame.extend_from_slice(&(len as u32).to_be_bytes());
    frame.extend_from_slice(key.as_bytes());
    Ok(frame)
}
