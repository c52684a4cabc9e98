//! Query handlers and the externally observable game snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use supertoe_core::clock::Clock;
use supertoe_core::error::DomainError;
use supertoe_core::store::StateStore;
use tracing::instrument;

use crate::application::command_handlers::load_state;
use crate::domain::board::{GRID_SIZE, Mark, SubBoardResult};
use crate::domain::state::GameState;

/// Read-only snapshot of a game as sent to clients and observers.
///
/// Field names follow the web client's JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// `boards[board][cell]` as `""`, `"X"` or `"O"`.
    pub boards: [[&'static str; GRID_SIZE]; GRID_SIZE],
    /// Sub-board results as `""`, `"X"`, `"O"` or `"D"` (draw).
    pub board_winners: [&'static str; GRID_SIZE],
    /// Sub-board the next move must target, or -1 for any.
    pub next_board: i16,
    /// Winning mark, or `""` while undecided.
    pub winner: &'static str,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Earliest instant at which a move is accepted.
    pub next_move_time: DateTime<Utc>,
    /// Seconds until `next_move_time`, never negative.
    pub time_remaining: f64,
    /// Configured cooldown between moves, in seconds.
    pub timer_duration: u32,
}

impl GameView {
    /// Renders `state` as seen at `now`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_state(state: &GameState, now: DateTime<Utc>) -> Self {
        let boards = state
            .cells
            .map(|board| board.map(|cell| cell.map_or("", Mark::symbol)));
        let board_winners = state.sub_board_results().map(SubBoardResult::symbol);
        let next_board = state.active_board().map_or(-1, |b| i16::from(u8::from(b)));
        let remaining_ms = state.time_remaining(now).num_milliseconds();

        Self {
            boards,
            board_winners,
            next_board,
            winner: state.global_winner().map_or("", Mark::symbol),
            game_over: state.is_game_over(),
            next_move_time: state.next_move_deadline(),
            time_remaining: remaining_ms as f64 / 1000.0,
            timer_duration: state.move_cooldown_seconds(),
        }
    }
}

/// Loads the latest game and renders it.
///
/// `cached` is the in-memory copy used when the store holds nothing yet; it
/// is refreshed with whatever the store returns.
///
/// # Errors
///
/// Returns `DomainError::StoreUnavailable` if loading or decoding fails.
#[instrument(skip_all, fields(game_key = key))]
pub async fn get_game(
    key: &str,
    clock: &dyn Clock,
    store: &dyn StateStore,
    cached: &mut GameState,
) -> Result<GameView, DomainError> {
    let (state, _) = load_state(key, store, cached).await?;
    let view = GameView::from_state(&state, clock.now());
    *cached = state;
    Ok(view)
}
