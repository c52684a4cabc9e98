//! WebSocket endpoint: pushes game changes and relays chat between clients.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use supertoe_core::broadcast::{Broadcaster, Topic};
use supertoe_game::application::query_handlers::GameView;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::broadcast::Envelope;
use crate::state::AppState;

const MAX_USERNAME_CHARS: usize = 32;
const MAX_MESSAGE_CHARS: usize = 500;

/// A frame sent by a client.
#[derive(Debug, Deserialize)]
struct ClientFrame {
    event: Topic,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    username: Option<String>,
    message: String,
}

/// Parses a client frame into the chat payload to relay.
///
/// Only `chat_message` frames are accepted. The message is trimmed and must
/// be non-empty and at most 500 characters; the username is trimmed and cut
/// to 32 characters, defaulting to `"anonymous"`.
fn parse_chat(text: &str) -> Option<Value> {
    let frame: ClientFrame = serde_json::from_str(text).ok()?;
    if frame.event != Topic::ChatMessage {
        return None;
    }

    let chat: ChatPayload = serde_json::from_value(frame.data).ok()?;
    let message = chat.message.trim();
    if message.is_empty() || message.chars().count() > MAX_MESSAGE_CHARS {
        return None;
    }

    let username: String = chat
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("anonymous")
        .chars()
        .take(MAX_USERNAME_CHARS)
        .collect();

    Some(json!({ "username": username, "message": message }))
}

fn encode(envelope: &Envelope) -> Option<Message> {
    match serde_json::to_string(envelope) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            warn!(error = %e, "failed to encode websocket frame");
            None
        }
    }
}

fn snapshot_frame(view: &GameView) -> Option<Message> {
    let data = serde_json::to_value(view)
        .inspect_err(|e| warn!(error = %e, "failed to encode game snapshot"))
        .ok()?;
    encode(&Envelope {
        event: Topic::GameUpdate,
        data,
    })
}

/// GET /ws
async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before reading the snapshot so no commit falls in between.
    let mut updates = state.broadcaster.subscribe();
    info!(
        subscribers = state.broadcaster.subscriber_count(),
        "websocket client connected"
    );

    match state.game.get_state().await {
        Ok(view) => {
            if let Some(frame) = snapshot_frame(&view)
                && sender.send(frame).await.is_err()
            {
                return;
            }
        }
        Err(e) => warn!(error = %e, "could not load game for new websocket client"),
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(envelope) => {
                    let Some(frame) = encode(&envelope) else {
                        continue;
                    };
                    if sender.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagged; skipping missed messages");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let broadcaster = state.broadcaster.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => match parse_chat(text.as_str()) {
                    Some(chat) => broadcaster.publish(Topic::ChatMessage, chat),
                    None => debug!("ignoring unrecognized websocket frame"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("websocket client disconnected");
}

/// Returns the WebSocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}
