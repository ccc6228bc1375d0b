pub mod handlers;
mod play;
mod setup;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::SessionId;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Session to watch right away, e.g. when a second screen joins
    pub session: Option<SessionId>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request: session={:?}", params.session);

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// The session this connection listens to
struct Watch {
    session_id: SessionId,
    rx: broadcast::Receiver<ServerMessage>,
}

async fn watch(state: &AppState, session_id: &str) -> Option<Watch> {
    let rx = state.subscribe(session_id).await?;
    tracing::debug!("Connection now watching session {}", session_id);
    Some(Watch {
        session_id: session_id.to_string(),
        rx,
    })
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut watching = match &params.session {
        Some(session_id) => {
            let watching = watch(&state, session_id).await;
            // Give a joining screen something to draw
            let hello = match state.view(session_id).await {
                Ok(view) => ServerMessage::State { view },
                Err(e) => e.into(),
            };
            if let Ok(json) = serde_json::to_string(&hello) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    return;
                }
            }
            watching
        }
        None => None,
    };

    loop {
        tokio::select! {
            // Broadcasts for the watched session
            broadcast_msg = async {
                match &mut watching {
                    Some(w) => w.rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match broadcast_msg {
                    Ok(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        if matches!(msg, ServerMessage::SessionEnded { .. }) {
                            watching = None;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Connection lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        watching = None;
                    }
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                // Follow the session this screen is driving
                                let target = client_msg.session_id().cloned();
                                if let Some(target) = target {
                                    if watching.as_ref().map(|w| &w.session_id) != Some(&target) {
                                        watching = watch(&state, &target).await;
                                    }
                                }

                                if let Some(response) = handlers::handle_message(client_msg, &state).await {
                                    if let ServerMessage::SessionCreated { session_id, .. } = &response {
                                        watching = watch(&state, session_id).await;
                                    }
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            tracing::error!("Failed to send response");
                                            break;
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::error(
                                    "PARSE_ERROR",
                                    format!("Invalid message format: {}", e),
                                );
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!(
        "WebSocket connection closed (session {:?})",
        watching.as_ref().map(|w| &w.session_id)
    );
}
