//! In-process broadcaster backed by a `tokio::sync::broadcast` channel.

use serde::Serialize;
use serde_json::Value;
use supertoe_core::broadcast::{Broadcaster, Topic};
use tokio::sync::broadcast;

/// A message as delivered to WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Topic name, e.g. `game_update`.
    pub event: Topic,
    /// Topic payload.
    pub data: Value,
}

/// Fans published messages out to every subscribed WebSocket task.
///
/// Subscribers that fall more than `capacity` messages behind lose the
/// oldest ones instead of slowing down publishers.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<Envelope>,
}

impl ChannelBroadcaster {
    /// Creates a broadcaster buffering up to `capacity` messages per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber that receives every later message.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    /// Number of currently connected subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, topic: Topic, payload: Value) {
        let envelope = Envelope {
            event: topic,
            data: payload,
        };
        if self.sender.send(envelope).is_err() {
            // No subscribers right now; nothing to deliver.
            tracing::trace!(topic = topic.as_str(), "no subscribers for broadcast");
        }
    }
}
