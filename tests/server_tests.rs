//! End-to-end tests over the may_minihttp transport: raw HTTP in, dispatch
//! engine behavior observed on the wire.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

use switchboard::router::handler;
use switchboard::server::{AppService, HttpServer, ServerHandle};
use switchboard::Dispatcher;

mod common;

use tracing_util::TestTracing;

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn start_server(dispatcher: Dispatcher) -> (ServerHandle, SocketAddr) {
    common::setup_may_runtime();
    let addr = free_addr();
    let service = AppService::new(Arc::new(dispatcher));
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

/// Send one raw HTTP/1.1 request and read the response, using
/// Content-Length to find the end of the body.
fn roundtrip(addr: SocketAddr, raw: &str) -> (String, String) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap();
        assert!(n > 0, "connection closed before body was complete");
        buf.extend_from_slice(&chunk[..n]);
    }

    let status_line = head.lines().next().unwrap_or("").to_string();
    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();
    (status_line, body)
}

#[test]
fn test_end_to_end_dispatch() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    let root = dispatcher.root_group();
    root.get(
        "/users/:id",
        vec![handler(|ctx| {
            let id = ctx.param("id").unwrap_or("").to_string();
            ctx.text(&format!("user {id}"));
        })],
    )
    .unwrap();
    root.get(
        "/explode",
        vec![handler(|_ctx| panic!("kaboom"))],
    )
    .unwrap();

    let (handle, addr) = start_server(dispatcher);

    let (status, body) = roundtrip(
        addr,
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert!(status.contains("200"), "unexpected status line: {status}");
    assert_eq!(body, "user 42");

    let (status, body) = roundtrip(
        addr,
        "GET /nowhere HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert!(status.contains("404"), "unexpected status line: {status}");
    assert_eq!(body, "no match: GET /nowhere");

    // a faulting handler answers 500 and the server keeps serving
    let (status, body) = roundtrip(
        addr,
        "GET /explode HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert!(status.contains("500"), "unexpected status line: {status}");
    assert_eq!(body, "runtime error: kaboom");

    let (status, _body) = roundtrip(
        addr,
        "GET /users/7 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert!(status.contains("200"), "unexpected status line: {status}");

    handle.stop();
}
