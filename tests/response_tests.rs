//! Tests for the Response Receiver
//!
//! These tests verify:
//! - Identical results regardless of chunking
//! - Exact file_size handling (extra bytes ignored, missing bytes fail)
//! - Server-reported errors
//! - Driving the parser from an async reader

mod common;

use bytes::Bytes;
use common::{error_response, metadata_json, random_chunks, success_response, test_data};
use vidpress::network::receive_response;
use vidpress::protocol::{
    encode_response_header, ProcessedMedia, ReceiveProgress, ResponseReceiver,
};
use vidpress::ProcessingError;

// =============================================================================
// Helper Functions
// =============================================================================

/// Feed all chunks and return the terminal result, or None if still pending
fn feed_all<I, C>(chunks: I) -> Option<Result<ProcessedMedia, ProcessingError>>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut receiver = ResponseReceiver::new();
    for chunk in chunks {
        match receiver.feed(chunk.as_ref()) {
            Ok(ReceiveProgress::NeedMore) => {}
            Ok(ReceiveProgress::Complete(media)) => return Some(Ok(media)),
            Ok(ReceiveProgress::Resolved) => panic!("fed after resolution"),
            Err(e) => return Some(Err(e)),
        }
    }
    None
}

fn expect_media(result: Option<Result<ProcessedMedia, ProcessingError>>) -> ProcessedMedia {
    match result {
        Some(Ok(media)) => media,
        other => panic!("Expected media, got {:?}", other),
    }
}

// =============================================================================
// Chunking Invariance Tests
// =============================================================================

#[test]
fn test_same_result_for_any_chunking() {
    let body = test_data(4000, 7);
    let bytes = success_response("mp4", &body);

    let whole = expect_media(feed_all([&bytes]));
    let single_bytes = expect_media(feed_all(bytes.iter().map(|b| [*b])));

    assert_eq!(whole.file_extension, "mp4");
    assert_eq!(&whole.data[..], &body[..]);
    assert_eq!(whole, single_bytes);

    for seed in 1..20 {
        let chunks = random_chunks(&bytes, 97, seed);
        assert_eq!(expect_media(feed_all(chunks)), whole);
    }
}

#[test]
fn test_error_same_for_any_chunking() {
    let bytes = error_response("invalid resolution");

    for chunks in [
        vec![bytes.clone()],
        bytes.iter().map(|b| vec![*b]).collect(),
        random_chunks(&bytes, 4, 3),
    ] {
        match feed_all(chunks) {
            Some(Err(ProcessingError::ServerReported(message))) => {
                assert_eq!(message, "invalid resolution")
            }
            other => panic!("Expected ServerReported, got {:?}", other),
        }
    }
}

#[test]
fn test_header_split_across_chunks() {
    let bytes = success_response("webm", b"payload");
    let chunks = [&bytes[..1], &bytes[1..4], &bytes[4..5], &bytes[5..]];

    let media = expect_media(feed_all(chunks));
    assert_eq!(media.file_extension, "webm");
    assert_eq!(&media.data[..], b"payload");
}

#[test]
fn test_metadata_and_body_in_same_chunk_as_header() {
    let body = test_data(64, 11);
    let bytes = success_response("mkv", &body);

    let mut receiver = ResponseReceiver::new();
    match receiver.feed(&bytes).unwrap() {
        ReceiveProgress::Complete(media) => assert_eq!(&media.data[..], &body[..]),
        other => panic!("Expected Complete, got {:?}", other),
    }
}

// =============================================================================
// Body Size Tests
// =============================================================================

#[test]
fn test_exact_body_length() {
    let body = test_data(500, 1);
    let media = expect_media(feed_all([success_response("mp4", &body)]));
    assert_eq!(media.data.len(), 500);
}

#[test]
fn test_extra_bytes_ignored() {
    let body = test_data(500, 2);
    let mut bytes = success_response("mp4", &body);
    bytes.extend_from_slice(&[0xEE; 5]);

    let media = expect_media(feed_all([&bytes]));
    assert_eq!(media.data.len(), 500);
    assert_eq!(&media.data[..], &body[..]);

    // Same when the extra bytes arrive in their own chunk
    let split = bytes.len() - 5;
    let media = expect_media(feed_all([&bytes[..split], &bytes[split..]]));
    assert_eq!(&media.data[..], &body[..]);
}

#[test]
fn test_missing_byte_is_premature_close() {
    let body = test_data(500, 3);
    let bytes = success_response("mp4", &body);

    let mut receiver = ResponseReceiver::new();
    let progress = receiver.feed(&bytes[..bytes.len() - 1]).unwrap();
    assert_eq!(progress, ReceiveProgress::NeedMore);
    assert_eq!(receiver.bytes_required(), 1);

    assert!(matches!(
        receiver.premature_close(),
        ProcessingError::PrematureClose {
            received: 499,
            expected: 500,
            ..
        }
    ));
}

#[test]
fn test_error_status_with_empty_message() {
    match feed_all([encode_response_header(0x00, 0)]) {
        Some(Err(ProcessingError::ServerReported(message))) => assert!(message.is_empty()),
        other => panic!("Expected ServerReported, got {:?}", other),
    }
}

#[test]
fn test_any_nonzero_status_is_success() {
    let metadata = metadata_json("mp4", 2);
    let mut bytes = encode_response_header(0x7A, metadata.len() as u32).to_vec();
    bytes.extend_from_slice(metadata.as_bytes());
    bytes.extend_from_slice(b"ok");

    let media = expect_media(feed_all([&bytes]));
    assert_eq!(&media.data[..], b"ok");
}

// =============================================================================
// Async Driver Tests
// =============================================================================

#[tokio::test]
async fn test_receive_from_reader() {
    let body = test_data(4000, 5);
    let bytes = success_response("mp4", &body);
    let mut reader = &bytes[..];

    let media = receive_response(&mut reader, Bytes::new(), 16).await.unwrap();
    assert_eq!(media.file_extension, "mp4");
    assert_eq!(&media.data[..], &body[..]);
}

#[tokio::test]
async fn test_receive_uses_leftover_first() {
    let bytes = success_response("mp3", b"audio-bytes");
    let (head, tail) = bytes.split_at(9);
    let mut reader = tail;

    let media = receive_response(&mut reader, Bytes::copy_from_slice(head), 4)
        .await
        .unwrap();
    assert_eq!(&media.data[..], b"audio-bytes");
}

#[tokio::test]
async fn test_receive_completes_from_leftover_alone() {
    let bytes = success_response("mp3", b"tiny");
    let mut reader: &[u8] = &[];

    let media = receive_response(&mut reader, Bytes::from(bytes), 4)
        .await
        .unwrap();
    assert_eq!(&media.data[..], b"tiny");
}

#[tokio::test]
async fn test_receive_end_of_stream_in_header() {
    let mut reader: &[u8] = &[0x01, 0x00];

    match receive_response(&mut reader, Bytes::new(), 64).await {
        Err(ProcessingError::PrematureClose {
            state,
            received,
            expected,
        }) => {
            assert_eq!(state, "awaiting header");
            assert_eq!(received, 2);
            assert_eq!(expected, 5);
        }
        other => panic!("Expected PrematureClose, got {:?}", other),
    }
}

#[tokio::test]
async fn test_receive_end_of_stream_in_body() {
    let bytes = success_response("mp4", &test_data(100, 9));
    let mut reader = &bytes[..bytes.len() - 1];

    assert!(matches!(
        receive_response(&mut reader, Bytes::new(), 64).await,
        Err(ProcessingError::PrematureClose {
            received: 99,
            expected: 100,
            ..
        })
    ));
}

#[tokio::test]
async fn test_receive_malformed_metadata() {
    let mut bytes = encode_response_header(0x01, 5).to_vec();
    bytes.extend_from_slice(b"{bad}");
    let mut reader = &bytes[..];

    assert!(matches!(
        receive_response(&mut reader, Bytes::new(), 64).await,
        Err(ProcessingError::MalformedMetadata(_))
    ));
}
