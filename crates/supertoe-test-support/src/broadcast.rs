//! Test broadcaster: records published messages.

use std::sync::Mutex;

use serde_json::Value;
use supertoe_core::broadcast::{Broadcaster, Topic};

/// A broadcaster that keeps every published `(topic, payload)` pair.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    published: Mutex<Vec<(Topic, Value)>>,
}

impl RecordingBroadcaster {
    /// Creates a broadcaster with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(Topic, Value)> {
        self.published.lock().unwrap().clone()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, topic: Topic, payload: Value) {
        self.published.lock().unwrap().push((topic, payload));
    }
}
