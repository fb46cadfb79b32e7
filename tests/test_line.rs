use std::io::Cursor;

use httpd::http::error::ProtocolError;
use httpd::http::line::{read_line, write_line};

#[tokio::test]
async fn test_read_crlf_terminated_line() {
    let mut input: &[u8] = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let line = read_line(&mut input).await.unwrap();

    assert_eq!(line, "GET / HTTP/1.1");
}

#[tokio::test]
async fn test_read_successive_lines() {
    let mut input: &[u8] = b"first\r\nsecond\r\n\r\n";

    assert_eq!(read_line(&mut input).await.unwrap(), "first");
    assert_eq!(read_line(&mut input).await.unwrap(), "second");
    assert_eq!(read_line(&mut input).await.unwrap(), "");
}

#[tokio::test]
async fn test_eof_yields_partial_content() {
    let mut input: &[u8] = b"no terminator";
    let line = read_line(&mut input).await.unwrap();

    assert_eq!(line, "no terminator");
}

#[tokio::test]
async fn test_eof_on_empty_stream_yields_empty_line() {
    let mut input: &[u8] = b"";
    assert_eq!(read_line(&mut input).await.unwrap(), "");
}

#[tokio::test]
async fn test_bare_line_feed_is_a_protocol_violation() {
    let mut input: &[u8] = b"GET / HTTP/1.1\n";
    let err = read_line(&mut input).await.unwrap_err();

    assert!(matches!(err, ProtocolError::BareLineFeed));
}

#[tokio::test]
async fn test_non_ascii_byte_is_rejected() {
    let mut input: &[u8] = b"caf\xe9\r\n";
    let err = read_line(&mut input).await.unwrap_err();

    assert!(matches!(err, ProtocolError::NonAscii(0xe9)));
}

#[tokio::test]
async fn test_stray_carriage_return_is_dropped() {
    // A CR not followed by LF never reaches the accumulated content.
    let mut input: &[u8] = b"a\rb\r\n";
    let line = read_line(&mut input).await.unwrap();

    assert_eq!(line, "ab");
}

#[tokio::test]
async fn test_write_line_appends_crlf() {
    let mut out = Cursor::new(Vec::new());
    write_line(&mut out, "date: now").await.unwrap();

    assert_eq!(out.into_inner(), b"date: now\r\n");
}

#[tokio::test]
async fn test_write_empty_line_writes_bare_terminator() {
    let mut out = Cursor::new(Vec::new());
    write_line(&mut out, "").await.unwrap();

    assert_eq!(out.into_inner(), b"\r\n");
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let mut out = Cursor::new(Vec::new());
    write_line(&mut out, "hello world").await.unwrap();

    let bytes = out.into_inner();
    let mut input: &[u8] = &bytes;
    assert_eq!(read_line(&mut input).await.unwrap(), "hello world");
}
