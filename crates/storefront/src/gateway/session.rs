//! WebSocket session handler using Axum.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::error::GatewayError;
use super::hub::ConnectionId;
use super::protocol::{ServerMessage, parse_request};
use super::Gateway;
use crate::state::AppState;

/// Interval between keepalive pings.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let gateway = Arc::clone(state.gateway());
    ws.on_upgrade(move |socket| handle_socket(socket, gateway))
}

/// Drive one WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>) {
    let (id, mut rx) = match gateway.connect() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialise client");
            return;
        }
    };
    info!(connection_id = %id, clients = gateway.hub().client_count(), "Client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Forward queued frames to the socket
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    let mut keepalive = interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        if handle_message(&gateway, &id, msg).is_break() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(connection_id = %id, error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }

            _ = keepalive.tick() => {
                if send_keepalive(&gateway, &id).is_break() {
                    break;
                }
            }
        }
    }

    gateway.disconnect(&id);
    send_task.abort();

    info!(connection_id = %id, clients = gateway.hub().client_count(), "Client disconnected");
}

/// Queue a keepalive ping. A full buffer only skips this ping; the session
/// ends once the client is gone.
fn send_keepalive(gateway: &Gateway, id: &ConnectionId) -> ControlFlow<()> {
    match gateway.hub().send_raw(id, Message::Ping(Vec::new().into())) {
        Ok(()) => ControlFlow::Continue(()),
        Err(GatewayError::BufferFull(_)) => {
            debug!(connection_id = %id, "Skipping keepalive for slow client");
            ControlFlow::Continue(())
        }
        Err(e) => {
            debug!(connection_id = %id, error = %e, "Keepalive failed");
            ControlFlow::Break(())
        }
    }
}

/// Handle a single inbound frame.
fn handle_message(gateway: &Gateway, id: &ConnectionId, msg: Message) -> ControlFlow<()> {
    match msg {
        Message::Text(text) => dispatch(gateway, id, text.as_str()),
        Message::Binary(data) => match std::str::from_utf8(&data) {
            Ok(text) => dispatch(gateway, id, text),
            Err(_) => reject(gateway, id, "Frames must be UTF-8 JSON"),
        },
        // Pongs are queued by the socket itself
        Message::Ping(_) | Message::Pong(_) => {}
        Message::Close(_) => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

fn dispatch(gateway: &Gateway, id: &ConnectionId, text: &str) {
    match parse_request(text) {
        Ok((ack, request)) => {
            if let Err(e) = gateway.handle(id, ack, request) {
                warn!(connection_id = %id, error = %e, "Failed to reply to client");
            }
        }
        Err(e) => reject(gateway, id, &format!("Malformed request: {e}")),
    }
}

fn reject(gateway: &Gateway, id: &ConnectionId, message: &str) {
    debug!(connection_id = %id, message, "Rejecting frame");
    let error = ServerMessage::Error {
        message: message.to_string(),
    };
    if let Err(e) = gateway.hub().send_to(id, &error) {
        warn!(connection_id = %id, error = %e, "Failed to send error frame");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn connected() -> (Gateway, ConnectionId, tokio::sync::mpsc::Receiver<Message>) {
        let gateway = Gateway::new(Arc::new(InMemoryCatalog::default()), 8);
        let (id, mut rx) = gateway.connect().unwrap();
        rx.try_recv().unwrap();
        (gateway, id, rx)
    }

    fn event(rx: &mut tokio::sync::mpsc::Receiver<Message>) -> serde_json::Value {
        let Message::Text(text) = rx.try_recv().unwrap() else {
            panic!("expected a text frame");
        };
        serde_json::from_str(text.as_str()).unwrap()
    }

    #[test]
    fn test_malformed_frame_gets_error_and_keeps_connection() {
        let (gateway, id, mut rx) = connected();

        let flow = handle_message(&gateway, &id, Message::Text("{oops".into()));
        assert!(flow.is_continue());

        let reply = event(&mut rx);
        assert_eq!(reply["event"], "error");
        assert!(reply["data"]["message"].as_str().unwrap().starts_with("Malformed request"));
    }

    #[test]
    fn test_binary_json_is_accepted() {
        let (gateway, id, mut rx) = connected();

        let frame = Message::Binary(br#"{"event":"ping"}"#.to_vec().into());
        assert!(handle_message(&gateway, &id, frame).is_continue());
        assert_eq!(event(&mut rx)["event"], "pong");
    }

    #[test]
    fn test_keepalive_skips_full_buffer() {
        let gateway = Gateway::new(Arc::new(InMemoryCatalog::default()), 1);
        // inventory_init stays queued, so the single slot is taken
        let (id, mut rx) = gateway.connect().unwrap();

        assert!(send_keepalive(&gateway, &id).is_continue());

        assert!(matches!(rx.try_recv().unwrap(), Message::Text(_)));
        assert!(rx.try_recv().is_err());

        assert!(send_keepalive(&gateway, &id).is_continue());
        assert!(matches!(rx.try_recv().unwrap(), Message::Ping(_)));
    }

    #[test]
    fn test_keepalive_ends_session_for_gone_client() {
        let (gateway, id, rx) = connected();
        drop(rx);
        assert!(send_keepalive(&gateway, &id).is_break());

        gateway.disconnect(&id);
        assert!(send_keepalive(&gateway, &id).is_break());
    }

    #[test]
    fn test_close_frame_ends_session() {
        let (gateway, id, _rx) = connected();
        assert!(handle_message(&gateway, &id, Message::Close(None)).is_break());
    }

    #[test]
    fn test_text_request_is_dispatched() {
        let (gateway, id, mut rx) = connected();

        let frame = Message::Text(
            r#"{"event":"purchase","ack":4,"data":[{"id":"2","quantity":1}]}"#.into(),
        );
        assert!(handle_message(&gateway, &id, frame).is_continue());

        assert_eq!(event(&mut rx)["event"], "inventory_update");
        let ack = event(&mut rx);
        assert_eq!(ack["data"]["id"], 4);
        assert_eq!(ack["data"]["success"], true);
    }
}
