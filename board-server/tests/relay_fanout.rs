//! Relay fan-out integration tests.
//!
//! Connects real WebSocket clients to a running relay and checks that:
//! - frames reach every other peer on the board but not the sender
//! - boards are isolated from each other
//! - text and binary frames pass through verbatim and in order
//! - oversized frames are dropped without closing the connection
//! - closing one connection only removes that peer

mod common;

use std::time::Duration;

use board_core::{BoardMessage, Color, Point, StrokeStyle};
use board_server::RelayConfig;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use common::TestServer;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(url: &str) -> Client {
    let (ws, _) = connect_async(url).await.expect("failed to connect");
    ws
}

/// Receive the next data frame, skipping control frames.
async fn recv(client: &mut Client) -> Option<Message> {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .ok()??
            .ok()?;
        match msg {
            Message::Text(_) | Message::Binary(_) => return Some(msg),
            Message::Close(_) => return None,
            _ => {}
        }
    }
}

/// Assert that nothing arrives within a short window.
async fn assert_silent(client: &mut Client) {
    let result = timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "expected no frame, got {result:?}");
}

async fn send_text(client: &mut Client, text: &str) {
    client
        .send(Message::Text(text.to_string()))
        .await
        .expect("send failed");
}

async fn wait_for_peers(server: &TestServer, expected: usize) {
    for _ in 0..100 {
        if server.relay().peer_count().expect("registry") == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("relay never reached {expected} peers");
}

#[tokio::test]
async fn frame_reaches_others_but_not_sender() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;
    let mut c = connect(&server.ws_url()).await;

    send_text(&mut a, r#"{"type":"clear"}"#).await;

    assert_eq!(recv(&mut b).await, Some(Message::Text(r#"{"type":"clear"}"#.into())));
    assert_eq!(recv(&mut c).await, Some(Message::Text(r#"{"type":"clear"}"#.into())));
    assert_silent(&mut a).await;

    server.shutdown().await;
}

#[tokio::test]
async fn boards_are_isolated() {
    let server = TestServer::start().await;
    let mut a = connect(&server.board_url("one")).await;
    let mut b = connect(&server.board_url("two")).await;
    let mut c = connect(&server.board_url("one")).await;
    let mut d = connect(&server.ws_url()).await;

    send_text(&mut a, "for board one").await;

    assert_eq!(recv(&mut c).await, Some(Message::Text("for board one".into())));
    assert_silent(&mut b).await;
    assert_silent(&mut d).await;

    server.shutdown().await;
}

#[tokio::test]
async fn board_messages_pass_verbatim() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;

    let sent = [
        BoardMessage::begin_path(Point::new(10.0, 20.0)),
        BoardMessage::draw(
            Point::new(11.5, 21.0),
            StrokeStyle::new(Color::rgb(255, 0, 0), 5.0),
        ),
        BoardMessage::Undo { image: None },
    ];
    for message in &sent {
        send_text(&mut a, &message.to_json().expect("serialize")).await;
    }

    for expected in &sent {
        let Some(Message::Text(text)) = recv(&mut b).await else {
            panic!("expected a text frame");
        };
        let received = BoardMessage::from_json(&text).expect("relay must not alter frames");
        assert_eq!(&received, expected);
    }

    server.shutdown().await;
}

#[tokio::test]
async fn binary_frames_are_relayed() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;

    a.send(Message::Binary(vec![0, 1, 2, 255]))
        .await
        .expect("send failed");

    assert_eq!(recv(&mut b).await, Some(Message::Binary(vec![0, 1, 2, 255])));

    server.shutdown().await;
}

#[tokio::test]
async fn order_is_preserved() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;

    for i in 0..200 {
        send_text(&mut a, &i.to_string()).await;
    }
    for i in 0..200 {
        assert_eq!(recv(&mut b).await, Some(Message::Text(i.to_string())));
    }

    server.shutdown().await;
}

#[tokio::test]
async fn oversized_frame_is_dropped() {
    let server = TestServer::start_with(RelayConfig {
        max_message_bytes: 64,
        ..RelayConfig::default()
    })
    .await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;

    send_text(&mut a, &"x".repeat(100)).await;
    send_text(&mut a, "small").await;

    // The large frame never arrives, and the sender is still connected.
    assert_eq!(recv(&mut b).await, Some(Message::Text("small".into())));
    send_text(&mut a, "again").await;
    assert_eq!(recv(&mut b).await, Some(Message::Text("again".into())));

    server.shutdown().await;
}

#[tokio::test]
async fn closing_one_peer_keeps_the_rest() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let mut b = connect(&server.ws_url()).await;
    let mut c = connect(&server.ws_url()).await;
    wait_for_peers(&server, 3).await;

    b.close(None).await.expect("close failed");
    wait_for_peers(&server, 2).await;

    send_text(&mut a, "after close").await;
    assert_eq!(recv(&mut c).await, Some(Message::Text("after close".into())));

    server.shutdown().await;
}

#[tokio::test]
async fn late_joiner_sees_only_new_frames() {
    let server = TestServer::start().await;
    let mut a = connect(&server.ws_url()).await;
    let _b = connect(&server.ws_url()).await;

    send_text(&mut a, "before").await;
    wait_for_peers(&server, 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut late = connect(&server.ws_url()).await;
    send_text(&mut a, "after").await;
    assert_eq!(recv(&mut late).await, Some(Message::Text("after".into())));

    server.shutdown().await;
}

#[tokio::test]
async fn invalid_board_id_is_rejected() {
    let server = TestServer::start().await;

    let result = connect_async(server.board_url("bad.id")).await;
    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 400);
        }
        other => panic!("expected HTTP 400, got {other:?}"),
    }
    assert_eq!(server.relay().peer_count().expect("registry"), 0);

    server.shutdown().await;
}

/// Minimal HTTP/1.1 GET without pulling in an HTTP client.
async fn http_get(server: &TestServer, path: &str) -> String {
    let mut stream = TcpStream::connect(server.addr()).await.expect("connect");
    let request = format!(
        "GET {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        server.addr()
    );
    stream.write_all(request.as_bytes()).await.expect("write");
    let mut response = String::new();
    timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
        .await
        .expect("timed out")
        .expect("read");
    response
}

#[tokio::test]
async fn health_reports_connected_peers() {
    let server = TestServer::start().await;
    let _a = connect(&server.board_url("one")).await;
    let _b = connect(&server.board_url("two")).await;
    wait_for_peers(&server, 2).await;

    let live = http_get(&server, "/health/live").await;
    assert!(live.starts_with("HTTP/1.1 200"), "{live}");

    let ready = http_get(&server, "/health/ready").await;
    assert!(ready.starts_with("HTTP/1.1 200"), "{ready}");
    assert!(ready.contains("\"status\":\"healthy\""), "{ready}");
    assert!(ready.contains("\"peers\":2"), "{ready}");
    assert!(ready.contains("\"boards\":2"), "{ready}");

    server.shutdown().await;
}
