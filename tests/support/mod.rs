// Shared primitives for one-time server bootstrapping across integration tests.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Host:port published by the server thread once it is bound.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// Ensure the test server is running and return its host:port.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                clicker_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server(published_addr);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

fn wait_for_server(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

pub fn http_url(path: &str) -> String {
    format!("http://{}{}", ensure_server(), path)
}

pub async fn connect() -> Client {
    let url = format!("ws://{}/gamehub", ensure_server());
    let (client, _response) = connect_async(url).await.expect("websocket connect");
    client
}

pub async fn send(client: &mut Client, msg: Value) {
    client
        .send(Message::text(msg.to_string()))
        .await
        .expect("send client message");
}

// Read frames until one with the given `type` arrives; earlier frames are skipped.
pub async fn recv_type(client: &mut Client, ty: &str) -> Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let frame = client
                .next()
                .await
                .expect("stream open")
                .expect("websocket frame");
            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(text.as_str()).expect("server json");
                if value["type"] == ty {
                    return value;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {ty}"))
}

// Read frames until the server closes the socket; returns the close code it sent, if any.
pub async fn recv_close_code(client: &mut Client) -> Option<u16> {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(frame))) => return frame.map(|f| u16::from(f.code)),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("websocket error before close frame: {e}"),
                None => panic!("stream ended without a close frame"),
            }
        }
    })
    .await
    .expect("timed out waiting for close frame")
}
