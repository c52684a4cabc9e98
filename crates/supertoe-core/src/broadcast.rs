//! Broadcast abstraction for pushing updates to connected observers.

use serde::{Deserialize, Serialize};

/// Topics observers can receive.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// A move was accepted; the payload is the new game snapshot.
    GameUpdate,
    /// The game was reset; the payload is the fresh snapshot.
    GameReset,
    /// A chat message relayed between clients.
    ChatMessage,
}

impl Topic {
    /// Wire name of the topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameUpdate => "game_update",
            Self::GameReset => "game_reset",
            Self::ChatMessage => "chat_message",
        }
    }
}

/// Best-effort fan-out to observers.
///
/// Publishing never fails from the caller's point of view: a message that
/// cannot be delivered is dropped.
pub trait Broadcaster: Send + Sync {
    /// Publish `payload` on `topic`.
    fn publish(&self, topic: Topic, payload: serde_json::Value);
}
