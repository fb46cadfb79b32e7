use std::net::SocketAddr;

use httpd::event::HandlerFuture;
use httpd::http::response::StatusCode;
use httpd::server::{HttpServer, RequestEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Sends raw bytes to the server and reads the response until it closes the
/// connection.
async fn roundtrip(addr: SocketAddr, raw: &[u8]) -> String {
    let mut client = TcpStream::connect(("127.0.0.1", addr.port()))
        .await
        .unwrap();
    client.write_all(raw).await.unwrap();

    let mut buf = Vec::new();
    client.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn status_line(response: &str) -> &str {
    response.split("\r\n").next().unwrap()
}

fn body(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

async fn started_server() -> HttpServer {
    let mut server = HttpServer::new(0);
    server.start().await.unwrap();
    server
}

fn answer_hello(event: &mut RequestEvent) -> HandlerFuture<'_> {
    Box::pin(async move {
        if event.request.local_path() == "/hello" {
            let name = event
                .request
                .query_param("name")
                .unwrap_or("world")
                .to_string();
            event
                .response
                .with_status(StatusCode::Ok)
                .with_text(format!("hello {name}"));
            event.handled = true;
        }
        Ok(())
    })
}

fn always_fails(_event: &mut RequestEvent) -> HandlerFuture<'_> {
    Box::pin(async move { Err(anyhow::anyhow!("handler exploded")) })
}

#[tokio::test]
async fn test_unhandled_request_yields_not_found_with_path() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    let response = roundtrip(
        addr,
        b"GET /foo?x=bar HTTP/1.1\r\nHost: localhost:2323\r\n\r\n",
    )
    .await;

    assert_eq!(status_line(&response), "HTTP/1.1 404");
    assert!(body(&response).contains("/foo"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_handled_request_gets_the_subscriber_response() {
    let mut server = started_server().await;
    server.on_request().subscribe(answer_hello);
    let addr = server.local_addr().unwrap();

    let response = roundtrip(
        addr,
        b"GET /hello?name=peer HTTP/1.1\r\nHost: localhost:2323\r\n\r\n",
    )
    .await;

    assert_eq!(status_line(&response), "HTTP/1.1 200");
    assert!(response.contains("content-length: 10"));
    assert!(response.contains("connection: close"));
    assert_eq!(body(&response), "hello peer");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_start_line_yields_bad_request() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"\r\n").await;
    assert_eq!(status_line(&response), "HTTP/1.1 400");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_method_yields_405() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"TRACE / HTTP/1.1\r\n\r\n").await;
    assert_eq!(status_line(&response), "HTTP/1.1 405");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_version_yields_505() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"GET / HTTP/2.0\r\n\r\n").await;
    assert_eq!(status_line(&response), "HTTP/1.1 505");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_response_mirrors_http_10_version() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"GET / HTTP/1.0\r\n\r\n").await;
    assert_eq!(status_line(&response), "HTTP/1.0 404");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_failing_subscriber_yields_500_with_detail() {
    let mut server = started_server().await;
    server.on_request().subscribe(always_fails);
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(status_line(&response), "HTTP/1.1 500");
    assert!(body(&response).contains("handler exploded"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_are_independent() {
    let mut server = started_server().await;
    server.on_request().subscribe(answer_hello);
    let addr = server.local_addr().unwrap();

    // A peer that connects but never sends anything must not block others.
    let _idle = TcpStream::connect(("127.0.0.1", addr.port()))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let raw = format!("GET /hello?name={i} HTTP/1.1\r\n\r\n");
            roundtrip(addr, raw.as_bytes()).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap();
        assert_eq!(status_line(&response), "HTTP/1.1 200");
        assert_eq!(body(&response), format!("hello {i}"));
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_twice_fails() {
    let mut server = started_server().await;
    assert!(server.is_listening());
    assert!(server.start().await.is_err());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_releases_the_listening_socket() {
    let mut server = started_server().await;
    let addr = server.local_addr().unwrap();

    server.stop().await.unwrap();
    assert!(!server.is_listening());
    assert!(server.local_addr().is_none());

    assert!(TcpStream::connect(("127.0.0.1", addr.port())).await.is_err());

    // Stopping again is a no-op.
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_can_be_restarted() {
    let mut server = started_server().await;
    server.stop().await.unwrap();

    server.start().await.unwrap();
    let addr = server.local_addr().unwrap();

    let response = roundtrip(addr, b"GET /again HTTP/1.1\r\n\r\n").await;
    assert_eq!(status_line(&response), "HTTP/1.1 404");

    server.stop().await.unwrap();
}
