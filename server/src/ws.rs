// Live light channel
//
// Browsers send `{"event": ..., "data": ...}` text frames; replies to a
// request go to that socket only, state changes fan out to every socket
// through the relay's broadcaster.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use casa_core::{LightEvent, Room};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Requests a client may send
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "light:getStatus")]
    GetStatus,
    #[serde(rename = "light:toggle")]
    Toggle { room: String, state: bool },
    #[serde(rename = "light:toggleAll")]
    ToggleAll { state: bool },
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut updates = state.relay.broadcaster().subscribe();
    info!(
        target: "ws",
        clients = state.relay.broadcaster().subscriber_count(),
        "Client connected"
    );

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_client_message(&state, &text).await {
                        if send_event(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(target: "ws", error = %e, "Socket error");
                    break;
                }
            },
            update = updates.recv() => match update {
                Ok(event) => {
                    if send_event(&mut socket, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "ws", skipped, "Client lagging, updates dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!(target: "ws", "Client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &LightEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(e) => {
            warn!(target: "ws", error = %e, "Failed to serialize event");
            Ok(())
        }
    }
}

/// Handle one client frame, returning the reply meant for that client only.
///
/// Successful toggles reply nothing here: the status update comes back
/// through the broadcaster like it does for every other client.
pub async fn handle_client_message(state: &AppState, text: &str) -> Option<LightEvent> {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(target: "ws", error = %e, "Unrecognized client message");
            return Some(LightEvent::error(format!("Unrecognized message: {}", e)));
        }
    };
    debug!(target: "ws", event = ?event, "Client message");

    match event {
        ClientEvent::GetStatus => Some(match state.relay.status().await {
            Ok(states) => LightEvent::Status(states),
            Err(e) => LightEvent::error(e.to_string()),
        }),
        ClientEvent::Toggle { room, state: on } => {
            let room: Room = match room.parse() {
                Ok(room) => room,
                Err(e) => return Some(LightEvent::error(e.to_string())),
            };
            state
                .relay
                .toggle(room, on)
                .await
                .err()
                .map(|e| LightEvent::error(e.to_string()))
        }
        ClientEvent::ToggleAll { state: on } => state
            .relay
            .toggle_all(on)
            .await
            .err()
            .map(|e| LightEvent::error(e.to_string())),
    }
}
