//! Shared helpers for integration tests
//!
//! A minimal in-process peer that speaks the server side of the protocol.

#![allow(dead_code)]

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use vidpress::protocol::{
    decode_request_header, encode_key_frame, encode_response_header, RequestHeader,
    REQUEST_HEADER_SIZE,
};

pub const CLIENT_KEY: &str =
    "-----BEGIN PUBLIC KEY-----\nY2xpZW50LWtleQ==\n-----END PUBLIC KEY-----\n";
pub const SERVER_KEY: &str =
    "-----BEGIN PUBLIC KEY-----\nc2VydmVyLWtleQ==\n-----END PUBLIC KEY-----\n";

/// What the fake server saw from the client
#[derive(Debug)]
pub struct ReceivedRequest {
    pub header: RequestHeader,
    pub params: serde_json::Value,
    pub media_type: String,
    pub payload: Vec<u8>,
}

// =============================================================================
// Server Side Helpers
// =============================================================================

/// Read the client's length-prefixed key frame
pub async fn read_key_frame<R: AsyncRead + Unpin>(reader: &mut R) -> String {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await.unwrap();
    let mut key = vec![0u8; u32::from_be_bytes(prefix) as usize];
    reader.read_exact(&mut key).await.unwrap();
    String::from_utf8(key).unwrap()
}

pub async fn write_key_frame<W: AsyncWrite + Unpin>(writer: &mut W, key: &str) {
    writer.write_all(&encode_key_frame(key).unwrap()).await.unwrap();
}

/// Read a full request frame (header, params, media type, file bytes)
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> ReceivedRequest {
    let mut header = [0u8; REQUEST_HEADER_SIZE];
    reader.read_exact(&mut header).await.unwrap();
    let header = decode_request_header(&header).unwrap();

    let mut params = vec![0u8; header.json_size as usize];
    reader.read_exact(&mut params).await.unwrap();

    let mut media_type = vec![0u8; header.media_type_size as usize];
    reader.read_exact(&mut media_type).await.unwrap();

    let mut payload = vec![0u8; header.payload_size as usize];
    reader.read_exact(&mut payload).await.unwrap();

    ReceivedRequest {
        header,
        params: serde_json::from_slice(&params).unwrap(),
        media_type: String::from_utf8(media_type).unwrap(),
        payload,
    }
}

// =============================================================================
// Response Builders
// =============================================================================

pub fn metadata_json(extension: &str, file_size: usize) -> String {
    format!(
        r#"{{"file_extension":"{}","file_size":{}}}"#,
        extension, file_size
    )
}

/// Success response carrying `body` as the processed file
pub fn success_response(extension: &str, body: &[u8]) -> Vec<u8> {
    let metadata = metadata_json(extension, body.len());
    let mut bytes = encode_response_header(0x01, metadata.len() as u32).to_vec();
    bytes.extend_from_slice(metadata.as_bytes());
    bytes.extend_from_slice(body);
    bytes
}

/// Error response with a text message
pub fn error_response(message: &str) -> Vec<u8> {
    let mut bytes = encode_response_header(0x00, message.len() as u32).to_vec();
    bytes.extend_from_slice(message.as_bytes());
    bytes
}

/// Deterministic pseudo-random test data
pub fn test_data(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = lcg(state);
            (state >> 33) as u8
        })
        .collect()
}

/// Split `bytes` into chunks of pseudo-random sizes in `1..=max`
pub fn random_chunks(bytes: &[u8], max: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut state = seed;
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        state = lcg(state);
        let size = 1 + (state >> 33) as usize % max;
        let end = (offset + size).min(bytes.len());
        chunks.push(bytes[offset..end].to_vec());
        offset = end;
    }
    chunks
}

fn lcg(state: u64) -> u64 {
    state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub fn write_file(dir: &std::path::Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
