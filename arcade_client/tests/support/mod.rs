// Shared fake WebSocket server for integration tests, started once per test binary.
#![allow(dead_code)]

use axum::{
    Router,
    extract::{
        Path,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

// Address (`host:port`) the server thread bound.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();
// Text frames received on `/record/{id}`, per id.
static RECORDED: OnceLock<Mutex<HashMap<String, Vec<String>>>> = OnceLock::new();

/// Base URL of the fake server, `ws://host:port`.
pub fn ensure_server() -> String {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // The server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                axum::serve(listener, router()).await.expect("server failed");
            });
        });
        wait_for_readiness(published);
    });

    format!(
        "ws://{}",
        SERVER_ADDR.get().expect("server address should be initialized")
    )
}

/// Frames recorded for `id` so far.
pub fn recorded(id: &str) -> Vec<String> {
    RECORDED
        .get_or_init(Default::default)
        .lock()
        .expect("recorder lock")
        .get(id)
        .cloned()
        .unwrap_or_default()
}

/// Address that refuses connections.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("ws://{addr}")
}

fn router() -> Router {
    Router::new()
        .route("/pong", get(|ws: WebSocketUpgrade| upgrade(ws, pong_script)))
        .route("/echo", get(|ws: WebSocketUpgrade| upgrade(ws, echo)))
        .route("/close", get(|ws: WebSocketUpgrade| upgrade(ws, close_with_reason)))
        .route("/silent", get(|ws: WebSocketUpgrade| upgrade(ws, silent)))
        .route(
            "/record/{id}",
            get(|ws: WebSocketUpgrade, Path(id): Path<String>| async move {
                ws.on_upgrade(move |socket| record(socket, id))
            }),
        )
}

async fn upgrade<F, Fut>(ws: WebSocketUpgrade, handler: F) -> Response
where
    F: FnOnce(WebSocket) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    ws.on_upgrade(handler)
}

// Sends an unknown frame, then a join reply and one state update.
async fn pong_script(mut socket: WebSocket) {
    let frames = [
        r#"{"type":"chat","text":"hi"}"#,
        r#"{"type":"connected","player_number":2,"room_id":"r1","players_in_room":2,"player_name":"Ada"}"#,
        r#"{"type":"game_state","data":{"ballX":100,"ballY":50,"player1Y":10,"gameActive":true}}"#,
    ];
    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    // Keep reading so pings are answered.
    while let Some(Ok(_)) = socket.recv().await {}
}

// Replies to every text frame with a pong `error` carrying the frame.
async fn echo(mut socket: WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        if let Message::Text(text) = message {
            let reply = serde_json::json!({ "type": "error", "message": text.as_str() });
            if socket
                .send(Message::Text(reply.to_string().into()))
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

async fn close_with_reason(mut socket: WebSocket) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: 1000,
            reason: "bye".into(),
        })))
        .await;
}

// Holds the socket open without reading, so client pings go unanswered.
async fn silent(socket: WebSocket) {
    tokio::time::sleep(Duration::from_secs(30)).await;
    drop(socket);
}

async fn record(mut socket: WebSocket, id: String) {
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => RECORDED
                .get_or_init(Default::default)
                .lock()
                .expect("recorder lock")
                .entry(id.clone())
                .or_default()
                .push(text.as_str().to_string()),
            Message::Close(_) => break,
            _ => {}
        }
    }
}

fn wait_for_readiness(published: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}
