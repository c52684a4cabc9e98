//! Shared application state.

use std::sync::Arc;

use supertoe_game::application::service::GameService;

use crate::broadcast::ChannelBroadcaster;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The game every route operates on.
    pub game: Arc<GameService>,
    /// Channel WebSocket connections subscribe to. The game service publishes
    /// into the same channel.
    pub broadcaster: Arc<ChannelBroadcaster>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(game: Arc<GameService>, broadcaster: Arc<ChannelBroadcaster>) -> Self {
        Self { game, broadcaster }
    }
}
