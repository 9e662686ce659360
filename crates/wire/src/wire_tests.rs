// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use std::time::Duration;

use super::*;
use sj_core::{JobId, ObjectPath};

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Pong).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert_eq!(json_str, r#"{"type":"Pong"}"#);
}

#[test]
fn start_request_uses_defaults_for_optional_fields() {
    let req: Request = decode(br#"{"type":"Start","script":"echo hi"}"#).expect("decode");
    assert_eq!(
        req,
        Request::Start { script: "echo hi".to_string(), timeout_secs: 0, dump_needed: false }
    );
}

#[test]
fn job_ids_and_paths_serialize_as_plain_strings() {
    let resp = Response::Active { ids: vec![JobId::new("0123456789abcdef")] };
    let json = String::from_utf8(encode(&resp).unwrap()).unwrap();
    assert_eq!(json, r#"{"type":"Active","ids":["0123456789abcdef"]}"#);

    let req = Request::Call { path: ObjectPath::new("/sj/jobs/ab"), method: "cancel".into() };
    let json = String::from_utf8(encode(&req).unwrap()).unwrap();
    assert_eq!(json, r#"{"type":"Call","path":"/sj/jobs/ab","method":"cancel"}"#);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn read_message_on_empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed), "got {err:?}");
}

#[tokio::test]
async fn read_message_rejects_oversized_frame() {
    let len = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
    let mut cursor = std::io::Cursor::new(len.to_vec());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }), "got {err:?}");
}

#[tokio::test]
async fn read_message_truncated_payload_is_io_error() {
    let mut buffer = 10u32.to_be_bytes().to_vec();
    buffer.extend_from_slice(b"short");
    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Io(_)), "got {err:?}");
}

#[tokio::test]
async fn read_request_times_out_on_silent_peer() {
    let (_client, mut server) = tokio::io::duplex(64);
    let err = read_request(&mut server, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn frames_stream_back_to_back() {
    let mut buffer = Vec::new();
    let first = CollectorResponse::DumpCreated { path: ObjectPath::new("/dump/entry/1") };
    let second = CollectorResponse::Error { message: "busy".into() };
    write_frame(&mut buffer, &first).await.unwrap();
    write_frame(&mut buffer, &second).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let a: CollectorResponse = read_frame(&mut cursor).await.unwrap();
    let b: CollectorResponse = read_frame(&mut cursor).await.unwrap();
    assert_eq!(a, first);
    assert_eq!(b, second);
    let end = read_frame::<CollectorResponse, _>(&mut cursor).await.unwrap_err();
    assert!(matches!(end, ProtocolError::ConnectionClosed));
}
