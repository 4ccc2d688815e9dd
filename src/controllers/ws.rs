use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::hub::TicketUpdate;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_handler))
}

/// Message from a connected client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientMessage {
    JoinEvent {
        #[serde(rename = "eventId")]
        event_id: Uuid,
    },
}

/// Message pushed to a connected client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ServerMessage {
    TicketUpdated(TicketUpdate),
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one client connection.
///
/// The connection registers in the hub under a fresh observer id the
/// first time the client joins an event. Deltas flow hub → per-client
/// channel → socket, preserving publish order for this client.
/// Disconnecting, for any reason, drops all of the client's interest.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let observer_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<TicketUpdate>();
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!("socket {} connected", observer_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&ServerMessage::TicketUpdated(update)) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let hub = state.hub.clone();
    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::JoinEvent { event_id }) => {
                        recv_hub.subscribe(observer_id, event_id, &tx);
                    }
                    Err(_) => tracing::debug!("socket {} sent unrecognized message", observer_id),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the other one down.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unsubscribe(observer_id);
    tracing::debug!("socket {} disconnected", observer_id);
}
