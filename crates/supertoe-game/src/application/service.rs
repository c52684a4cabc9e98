//! The game service: one lock per game around every store round trip.

use std::fmt;
use std::sync::Arc;

use supertoe_core::broadcast::Broadcaster;
use supertoe_core::clock::Clock;
use supertoe_core::error::DomainError;
use supertoe_core::store::StateStore;
use tokio::sync::Mutex;

use crate::application::command_handlers::{self, MoveOutcome};
use crate::application::query_handlers::{self, GameView};
use crate::domain::commands::{PlaceMark, ResetGame};
use crate::domain::state::GameState;

/// Per-game settings fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// Store key the game is saved under.
    pub key: String,
    /// Pause enforced after every successful move, in seconds.
    pub move_cooldown_seconds: u32,
}

/// Owns one game and serializes every operation on it.
///
/// Each operation holds an async mutex for its whole load → transition →
/// save → publish sequence, including the store `.await`s, so concurrent
/// requests are linearized and broadcasts go out in commit order. The guarded
/// value is the last state this process saw; the store is consulted first on
/// every operation and the guarded value is only used while the store is
/// empty. Services in other processes sharing the store are kept apart by the
/// store's versioned saves: the one that saves second gets
/// `DomainError::ConcurrencyConflict`.
pub struct GameService {
    settings: GameSettings,
    clock: Arc<dyn Clock>,
    store: Arc<dyn StateStore>,
    broadcaster: Arc<dyn Broadcaster>,
    current: Mutex<GameState>,
}

impl GameService {
    /// Creates the service with a fresh game playable immediately.
    #[must_use]
    pub fn new(
        settings: GameSettings,
        clock: Arc<dyn Clock>,
        store: Arc<dyn StateStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let current = GameState::new(clock.now(), settings.move_cooldown_seconds);
        Self {
            settings,
            clock,
            store,
            broadcaster,
            current: Mutex::new(current),
        }
    }

    /// Returns the latest game.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store cannot be read.
    pub async fn get_state(&self) -> Result<GameView, DomainError> {
        let mut current = self.current.lock().await;
        query_handlers::get_game(
            &self.settings.key,
            self.clock.as_ref(),
            self.store.as_ref(),
            &mut current,
        )
        .await
    }

    /// Attempts a move. Rule violations come back as a rejected
    /// `MoveOutcome`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store cannot be read or
    /// written, or `DomainError::ConcurrencyConflict` if another service saved
    /// the game first; the move is then not applied.
    pub async fn attempt_move(&self, command: &PlaceMark) -> Result<MoveOutcome, DomainError> {
        let mut current = self.current.lock().await;
        command_handlers::handle_place_mark(
            command,
            &self.settings,
            self.clock.as_ref(),
            self.store.as_ref(),
            self.broadcaster.as_ref(),
            &mut current,
        )
        .await
    }

    /// Discards the game and starts a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the fresh game cannot be
    /// saved; the previous game then stays current.
    pub async fn reset_game(&self, command: &ResetGame) -> Result<GameView, DomainError> {
        let mut current = self.current.lock().await;
        command_handlers::handle_reset_game(
            command,
            &self.settings,
            self.clock.as_ref(),
            self.store.as_ref(),
            self.broadcaster.as_ref(),
            &mut current,
        )
        .await
    }
}

impl fmt::Debug for GameService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
