//! services/api/src/web/ws_handler.rs
//!
//! The WebSocket feed that tells the browser when to scroll the chat. Each
//! connection subscribes to the session's broadcast channel and forwards
//! every `ServerMessage` until the client leaves or the server shuts down.

use crate::web::{protocol::ServerMessage, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!("New WebSocket connection established: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let mut events = app_state.events.subscribe();

    let hello = ServerMessage::Connected {
        connection_id: connection_id.to_string(),
    };
    if send_message(&mut sender, &hello).await.is_err() {
        error!("Failed to send connected message.");
        return;
    }

    loop {
        tokio::select! {
            _ = app_state.shutdown.cancelled() => {
                info!("Server shutting down; closing WebSocket {}.", connection_id);
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            event = events.recv() => match event {
                Ok(message) => {
                    if send_message(&mut sender, &message).await.is_err() {
                        warn!("Failed to forward update; client may have disconnected.");
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("WebSocket {} lagged behind by {} updates.", connection_id, missed);
                    let notice = ServerMessage::Error {
                        message: format!("Missed {} updates; reload the session.", missed),
                    };
                    if send_message(&mut sender, &notice).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client closed WebSocket {}.", connection_id);
                    break;
                }
                Some(Ok(_)) => {
                    warn!("Ignoring message from client on WebSocket {}.", connection_id);
                }
                Some(Err(e)) => {
                    warn!("WebSocket {} errored: {}", connection_id, e);
                    break;
                }
            },
        }
    }

    info!("WebSocket connection {} closed.", connection_id);
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
