//! End-to-end test harness for the Aether storefront backend.
//!
//! Each test starts its own server in-process on an ephemeral port, so
//! tests run in parallel without sharing catalog state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aether-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let server = TestServer::start().await;
//! let mut client = server.connect().await;
//! let init = client.next_event().await;
//! assert_eq!(init["event"], "inventory_init");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aether_core::Product;
use aether_storefront::catalog::{InMemoryCatalog, default_products};
use aether_storefront::config::StorefrontConfig;
use aether_storefront::routes;
use aether_storefront::state::AppState;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// How long a test waits for an expected frame before failing.
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// A storefront backend served in-process on `127.0.0.1:<ephemeral>`.
///
/// The server and its activity feed are stopped when this is dropped.
pub struct TestServer {
    addr: SocketAddr,
    state: AppState,
    server: JoinHandle<()>,
    activity_feed: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the built-in catalog and an activity feed slow
    /// enough never to fire during a test.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        Self::start_with(default_products(), Duration::from_secs(3600)).await
    }

    /// Start a server with the given catalog and activity period.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with(products: Vec<Product>, activity_interval: Duration) -> Self {
        let config = StorefrontConfig {
            port: 0,
            activity_interval,
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config, Arc::new(InMemoryCatalog::new(products)));
        let activity_feed = state.start_activity_feed();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            addr,
            state,
            server,
            activity_feed,
        }
    }

    /// The server's application state, for inspecting the catalog directly.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// `http://` URL for `path`.
    #[must_use]
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Open a WebSocket session.
    ///
    /// # Panics
    ///
    /// Panics if the handshake fails.
    pub async fn connect(&self) -> WsClient {
        let url = format!("ws://{}/ws", self.addr);
        let (stream, _) = connect_async(url)
            .await
            .expect("WebSocket handshake failed");
        WsClient { stream }
    }

    /// Open a session and consume its `inventory_init` frame.
    ///
    /// # Panics
    ///
    /// Panics if the first frame is not `inventory_init`.
    pub async fn connect_ready(&self) -> (WsClient, Vec<Value>) {
        let mut client = self.connect().await;
        let init = client.expect_event("inventory_init").await;
        let products = init["data"]
            .as_array()
            .cloned()
            .expect("inventory_init carries a product array");
        (client, products)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.activity_feed.abort();
        self.server.abort();
    }
}

/// A WebSocket client speaking the session protocol.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send a JSON frame.
    ///
    /// # Panics
    ///
    /// Panics if the socket is closed.
    pub async fn send(&mut self, frame: &Value) {
        self.send_text(&frame.to_string()).await;
    }

    /// Send a raw text frame.
    ///
    /// # Panics
    ///
    /// Panics if the socket is closed.
    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_owned()))
            .await
            .expect("Failed to send frame");
    }

    /// Send a request event with a correlation ID.
    pub async fn request(&mut self, event: &str, ack: u64, data: Value) {
        self.send(&serde_json::json!({"event": event, "ack": ack, "data": data}))
            .await;
    }

    /// Wait for the next JSON frame, skipping control frames.
    ///
    /// # Panics
    ///
    /// Panics on timeout, on a closed socket or on a frame that is not JSON.
    pub async fn next_event(&mut self) -> Value {
        self.try_next_event(FRAME_TIMEOUT)
            .await
            .expect("Timed out waiting for a frame")
    }

    /// Wait up to `wait` for the next JSON frame.
    ///
    /// # Panics
    ///
    /// Panics on a closed socket or on a frame that is not JSON.
    pub async fn try_next_event(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .ok()?
                .expect("Socket closed")
                .expect("WebSocket error");
            match frame {
                Message::Text(text) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Frame is not JSON"));
                }
                Message::Close(_) => panic!("Server closed the session"),
                _ => {}
            }
        }
    }

    /// Wait for the next frame and assert its event name.
    ///
    /// # Panics
    ///
    /// Panics if the next frame carries a different event.
    pub async fn expect_event(&mut self, event: &str) -> Value {
        let frame = self.next_event().await;
        assert_eq!(frame["event"], event, "unexpected frame: {frame}");
        frame
    }

    /// Close the session.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
