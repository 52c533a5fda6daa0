//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use httpdump::config::RenderConfig;
use httpdump::http::SequenceAllocator;
use httpdump::output::MemorySink;
use httpdump::render::MessagePresenter;
use httpdump::stream::FlowDispatcher;

/// A dispatcher writing into a fresh in-memory sink.
pub fn memory_dispatcher(pretty: bool) -> (FlowDispatcher, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let presenter = MessagePresenter::with_config(sink.clone(), RenderConfig { pretty });
    let dispatcher = FlowDispatcher::new(Arc::new(SequenceAllocator::new()), presenter);
    (dispatcher, sink)
}

/// Start a mock upstream that reads one request head and answers with `body`
/// as `application/json`, then closes the connection.
#[allow(dead_code)]
pub async fn start_json_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut received = Vec::new();
                let mut buf = [0u8; 1024];
                while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => received.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Poll `sink` until it holds `count` records or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_for_records(sink: &MemorySink, count: usize, timeout: Duration) -> Vec<String> {
    let deadline = tokio::time::Instant::now() + timeout;
    while sink.len() < count && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    sink.records()
}
