use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::AppState;

/// First-contact registration. A client that never sends one still gets
/// the global event stream, just no guild-scoped config events.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterMessage {
    guild_id: Option<String>,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    let mut event_feed = state.broadcaster.subscribe();
    let (mut sink, mut stream) = socket.split();

    tracing::debug!(connection_id = %connection_id, "websocket connected");

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(message) = serde_json::from_str::<RegisterMessage>(&text) {
                            if let Some(guild_id) = message.guild_id {
                                state.sockets.register(connection_id, guild_id).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            event = event_feed.recv() => {
                let event = match event {
                    Ok(event) => event,
                    // A slow client skips what it missed; delivery is
                    // best-effort.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(connection_id = %connection_id, skipped, "websocket client lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if let Some(scope) = event.guild_scope() {
                    let registered = state.sockets.guild_for(&connection_id).await;
                    if registered.as_deref() != Some(scope) {
                        continue;
                    }
                }

                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::error!(error = ?err, "failed to serialize event");
                        continue;
                    }
                };
                if sink.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
        }
    }

    // Entry lifetime is tied to this task, not the other way around.
    state.sockets.remove(&connection_id).await;
    tracing::debug!(connection_id = %connection_id, "websocket disconnected");
}
