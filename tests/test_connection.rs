//! Session loop tests over an in-memory duplex transport.

use std::sync::Arc;
use std::time::Duration;

use meserver::config::Limits;
use meserver::http::connection::Connection;
use meserver::http::handler::{Handler, Hello};
use meserver::http::request::Request;
use meserver::http::response::{Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

fn spawn_connection(
    limits: Limits,
    handler: Arc<dyn Handler>,
) -> (DuplexStream, JoinHandle<anyhow::Result<()>>) {
    let (client, server) = tokio::io::duplex(1024);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, limits, handler);
        conn.run().await
    });
    (client, task)
}

/// Writes `input`, half-closes, and collects everything the server sends
/// until it closes its side.
async fn exchange(limits: Limits, input: &[u8]) -> (String, anyhow::Result<()>) {
    let (mut client, task) = spawn_connection(limits, Arc::new(Hello));

    client.write_all(input).await.unwrap();
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    let result = task.await.unwrap();
    (String::from_utf8(out).unwrap(), result)
}

fn hello(connection: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nConnection: {connection}\r\nContent-Length: 20\r\n\r\nHello from MeServer\n"
    )
}

#[tokio::test]
async fn test_keep_alive_scenario() {
    let (out, result) = exchange(
        Limits::default(),
        b"GET / HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello",
    )
    .await;

    assert!(out.starts_with("HTTP/1.1 200 OK\r\nConnection: keep-alive\r\n"));
    assert_eq!(out, hello("keep-alive"));
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_http10_closes_after_response() {
    // The second request must never be answered.
    let (out, result) = exchange(
        Limits::default(),
        b"GET / HTTP/1.0\r\n\r\nGET / HTTP/1.1\r\n\r\n",
    )
    .await;

    assert_eq!(out, hello("close"));
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_http10_keep_alive_serves_next_request() {
    let (out, _) = exchange(
        Limits::default(),
        b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\nGET / HTTP/1.0\r\n\r\n",
    )
    .await;

    assert_eq!(out, format!("{}{}", hello("keep-alive"), hello("close")));
}

#[tokio::test]
async fn test_pipelined_requests_answered_in_order() {
    let (out, _) = exchange(
        Limits::default(),
        b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc\
          GET /b HTTP/1.1\r\n\r\n\
          GET /c HTTP/1.1\r\nConnection: close\r\n\r\n\
          GET /d HTTP/1.1\r\n\r\n",
    )
    .await;

    assert_eq!(
        out,
        format!(
            "{}{}{}",
            hello("keep-alive"),
            hello("keep-alive"),
            hello("close")
        )
    );
}

#[tokio::test]
async fn test_bad_start_line_gets_400_and_close() {
    let (out, result) = exchange(
        Limits::default(),
        b"BADSTARTLINE\r\n\r\nGET / HTTP/1.1\r\n\r\n",
    )
    .await;

    assert_eq!(
        out,
        "HTTP/1.1 400 Bad Request\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_malformed_header_gets_400() {
    let (out, _) = exchange(
        Limits::default(),
        b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n",
    )
    .await;

    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\nConnection: close\r\n"));
}

#[tokio::test]
async fn test_oversized_headers_get_431_and_close() {
    let limits = Limits {
        max_header_size: 32,
        read_timeout: None,
    };
    let mut input = b"GET / HTTP/1.1\r\n".to_vec();
    input.extend_from_slice(&[b'a'; 64]);

    let (out, _) = exchange(limits, &input).await;

    assert_eq!(
        out,
        "HTTP/1.1 431 Request Header Fields Too Large\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn test_eof_mid_request_sends_nothing() {
    let (out, result) = exchange(
        Limits::default(),
        b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhel",
    )
    .await;

    assert!(out.is_empty());
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_fragmented_writes_keep_alive() {
    let (mut client, task) = spawn_connection(Limits::default(), Arc::new(Hello));

    for piece in [&b"GET / HT"[..], b"TP/1.1\r\nHo", b"st: x\r\n", b"\r", b"\n"] {
        client.write_all(piece).await.unwrap();
        client.flush().await.unwrap();
        tokio::task::yield_now().await;
    }

    let expected = hello("keep-alive");
    let mut buf = vec![0u8; expected.len()];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), expected);

    // Connection is still open for a second request.
    client
        .write_all(b"GET /again HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert_eq!(String::from_utf8(rest).unwrap(), hello("close"));

    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_custom_handler_sees_request() {
    let handler = |req: &Request| {
        let body = format!(
            "{} {} {} {}",
            req.method(),
            req.target(),
            req.header("host").unwrap_or("-"),
            String::from_utf8_lossy(&req.body)
        );
        Response::new(StatusCode::Created).with_body(body)
    };
    let (mut client, task) = spawn_connection(Limits::default(), Arc::new(handler));

    client
        .write_all(b"PUT /items/1 HTTP/1.1\r\nHost: api\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbody")
        .await
        .unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 201 Created\r\nConnection: close\r\nContent-Length: 21\r\n\r\nPUT /items/1 api body"
    );
    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_read_timeout_tears_down_connection() {
    let limits = Limits {
        read_timeout: Some(Duration::from_millis(50)),
        ..Limits::default()
    };
    let (mut client, task) = spawn_connection(limits, Arc::new(Hello));

    client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

    let result = task.await.unwrap();
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("read timed out"));

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
}
