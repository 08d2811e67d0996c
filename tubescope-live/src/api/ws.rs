//! Live WebSocket endpoint
//!
//! Each text frame from the client is a raw query; each result or error
//! string is pushed back as one text frame. The socket drives one
//! [`ConnectionGateway`] for its whole lifetime.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::mesh::ConnectionGateway;
use crate::AppState;

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let gateway =
        match ConnectionGateway::open(state.supervisor.clone(), outbound, state.ask_timeout).await {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!(error = %e, "Rejecting live connection");
                let _ = sink.close().await;
                return;
            }
        };
    let id = gateway.id();
    info!(connection = %id, "Live connection opened");

    let writer = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                gateway.forward(text.to_string()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection = %id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    gateway.close().await;
    // In-flight results after this point are dropped by their senders
    writer.abort();
    info!(connection = %id, "Live connection closed");
}
