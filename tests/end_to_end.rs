//! Whole flows through the dispatcher, from raw bytes to printed records.

mod common;

use std::fs;

use httpdump::http::Endpoints;
use httpdump::stream::replay_file;

use common::memory_dispatcher;

fn endpoints() -> Endpoints {
    Endpoints::parse("192.168.1.10:50000", "192.168.1.20:80")
}

#[tokio::test]
async fn test_json_request_rendered() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"GET /foo HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/json\r\n\r\n{\"a\":1}";

    dispatcher.spawn(endpoints(), flow).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0],
        "---------------------- [1] Request ----------------------\r\n\
         192.168.1.10:50000 -> 192.168.1.20:80\r\n\
         \r\n\
         GET /foo HTTP/1.1\r\n\
         Host: example.com\r\n\
         Content-Type: application/json\r\n\
         \r\n\
         {\n    \"a\": 1\n}\r\n"
    );
}

#[tokio::test]
async fn test_raw_body_when_pretty_disabled() {
    let (dispatcher, sink) = memory_dispatcher(false);
    let flow: &'static [u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\n\r\n<?xml version=\"1.0\"?><a><b>1</b></a>";

    dispatcher.spawn(endpoints().reversed(), flow).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].ends_with("\r\n<?xml version=\"1.0\"?><a><b>1</b></a>\r\n"));
    assert!(records[0].contains("192.168.1.20:80 -> 192.168.1.10:50000"));
}

#[tokio::test]
async fn test_xml_response_pretty_printed() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\n\r\n<?xml version=\"1.0\"?><a><b>1</b></a>";

    dispatcher.spawn(endpoints().reversed(), flow).await.unwrap();

    let records = sink.records();
    assert!(records[0].contains("<a>\n    <b>1</b>\n</a>"));
}

#[tokio::test]
async fn test_invalid_json_falls_back_to_raw() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"POST /api HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"a\":";

    dispatcher.spawn(endpoints(), flow).await.unwrap();

    assert!(sink.records()[0].ends_with("\r\n\r\n{\"a\":\r\n"));
}

#[tokio::test]
async fn test_chunked_body_keeps_data_lines() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";

    dispatcher.spawn(endpoints().reversed(), flow).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].ends_with("Transfer-Encoding: chunked\r\n\r\nhello\r\n world\r\n\r\n"));
}

#[tokio::test]
async fn test_websocket_frames_emitted_live() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] = b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\r\nhello\r\nworld\r\n";

    dispatcher.spawn(endpoints().reversed(), flow).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert!(records[0].starts_with("---------------------- [1] Response"));
    assert!(records[0].ends_with("Upgrade: websocket\r\nConnection: Upgrade\r\n\r\n"));
    assert_eq!(records[1], "[1] hello");
    assert_eq!(records[2], "[1] world");
}

#[tokio::test]
async fn test_non_http_flow_prints_nothing() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] = b"SSH-2.0-OpenSSH_9.6\r\n\r\n";

    dispatcher.spawn(endpoints(), flow).await.unwrap();
    assert!(sink.is_empty());

    let http: &'static [u8] = b"GET / HTTP/1.1\r\n\r\n";
    dispatcher.spawn(endpoints(), http).await.unwrap();
    assert!(sink.records()[0].contains("[1] Request"));
}

#[tokio::test]
async fn test_replay_file() {
    let path = std::env::temp_dir().join(format!("httpdump-replay-{}.txt", std::process::id()));
    fs::write(
        &path,
        "PUT /items/7 HTTP/1.1\r\nHost: api.local\r\nContent-Type: application/json\r\n\r\n[1,2]\r\n",
    )
    .unwrap();

    let (dispatcher, sink) = memory_dispatcher(true);
    replay_file(&path, endpoints(), &dispatcher).await.unwrap();
    let _ = fs::remove_file(&path);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].contains("PUT /items/7 HTTP/1.1\r\n"));
    assert!(records[0].ends_with("[\n    1,\n    2\n]\r\n"));
}

#[tokio::test]
async fn test_replay_missing_file() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let missing = std::env::temp_dir().join("httpdump-replay-does-not-exist.txt");

    assert!(replay_file(&missing, endpoints(), &dispatcher).await.is_err());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_truncated_xml_falls_back_to_raw() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\n\r\n<?xml version=\"1.0\"?><a><b>1</b>";

    dispatcher.spawn(endpoints().reversed(), flow).await.unwrap();

    assert!(sink.records()[0].ends_with("\r\n\r\n<?xml version=\"1.0\"?><a><b>1</b>\r\n"));
}

#[tokio::test]
async fn test_unclassified_content_type_keeps_json() {
    let (dispatcher, sink) = memory_dispatcher(true);
    let flow: &'static [u8] =
        b"POST / HTTP/1.1\r\nContent-Type: application/json\r\ncontent-type: text/plain\r\n\r\n{\"a\":1}";

    dispatcher.spawn(endpoints(), flow).await.unwrap();

    assert!(sink.records()[0].ends_with("{\n    \"a\": 1\n}\r\n"));
}
