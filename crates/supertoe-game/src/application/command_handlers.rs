//! Command handlers for the game.
//!
//! Each handler runs one load → transition → persist → publish sequence. The
//! caller is responsible for holding the game's lock around the call so that
//! sequences never interleave.

use serde::Serialize;
use supertoe_core::broadcast::{Broadcaster, Topic};
use supertoe_core::clock::Clock;
use supertoe_core::command::Command;
use supertoe_core::error::DomainError;
use supertoe_core::store::StateStore;
use tracing::{debug, info, instrument, warn};

use crate::application::query_handlers::GameView;
use crate::application::service::GameSettings;
use crate::domain::commands::{PlaceMark, ResetGame};
use crate::domain::rejection::MoveRejection;
use crate::domain::state::GameState;

/// Result of a move attempt that reached the rules engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Whether the move was committed.
    pub accepted: bool,
    /// Why the move was refused, when `accepted` is false.
    pub rejection: Option<MoveRejection>,
    /// The game after the attempt.
    pub state: GameView,
}

/// Loads the stored game for `key` together with its store version, falling
/// back to `cached` at version 0 when the store holds nothing yet.
///
/// # Errors
///
/// Returns `DomainError::StoreUnavailable` if the store fails or the stored
/// snapshot cannot be decoded.
pub(crate) async fn load_state(
    key: &str,
    store: &dyn StateStore,
    cached: &GameState,
) -> Result<(GameState, i64), DomainError> {
    match store.load(key).await? {
        Some(snapshot) => {
            let state = serde_json::from_value(snapshot.state).map_err(|e| {
                DomainError::StoreUnavailable(format!("stored game could not be decoded: {e}"))
            })?;
            Ok((state, snapshot.version))
        }
        None => Ok((cached.clone(), 0)),
    }
}

async fn save_state(
    key: &str,
    store: &dyn StateStore,
    expected_version: i64,
    state: &GameState,
) -> Result<i64, DomainError> {
    let snapshot = serde_json::to_value(state)
        .map_err(|e| DomainError::StoreUnavailable(format!("game could not be encoded: {e}")))?;
    store.save(key, expected_version, &snapshot).await
}

/// Publishes `payload`, logging rather than failing if it cannot be encoded.
fn publish<T: Serialize>(broadcaster: &dyn Broadcaster, topic: Topic, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => broadcaster.publish(topic, value),
        Err(e) => warn!(topic = topic.as_str(), error = %e, "dropping unencodable broadcast"),
    }
}

/// Handles the `PlaceMark` command.
///
/// Rule rejections are returned inside the `MoveOutcome`; nothing is saved or
/// published for them. On success the new state is saved first, conditional
/// on the version that was loaded, and only then becomes the cached state and
/// is published.
///
/// # Errors
///
/// Returns `DomainError::StoreUnavailable` if loading or saving fails, or
/// `DomainError::ConcurrencyConflict` if another server saved the game after
/// it was loaded here. The move is then not applied.
#[instrument(skip_all, fields(
    game_key = %settings.key,
    correlation_id = %command.correlation_id(),
    mark = %command.mark,
    board = %command.board,
    cell = %command.cell,
))]
pub async fn handle_place_mark(
    command: &PlaceMark,
    settings: &GameSettings,
    clock: &dyn Clock,
    store: &dyn StateStore,
    broadcaster: &dyn Broadcaster,
    cached: &mut GameState,
) -> Result<MoveOutcome, DomainError> {
    let key = settings.key.as_str();
    let (state, version) = load_state(key, store, cached).await?;
    let now = clock.now();

    match state.apply_move(command.mark, command.board, command.cell, now) {
        Ok(next) => {
            if let Err(e) = save_state(key, store, version, &next).await {
                if matches!(e, DomainError::ConcurrencyConflict { .. }) {
                    warn!(error = %e, "move not applied: game changed concurrently");
                } else {
                    warn!(error = %e, "move not applied: state could not be saved");
                }
                return Err(e);
            }
            let view = GameView::from_state(&next, now);
            *cached = next;
            publish(broadcaster, Topic::GameUpdate, &view);
            info!(command = PlaceMark::NAME, game_over = view.game_over, "move accepted");
            Ok(MoveOutcome {
                accepted: true,
                rejection: None,
                state: view,
            })
        }
        Err(rejection) => {
            debug!(reason = %rejection, "move rejected");
            let view = GameView::from_state(&state, now);
            *cached = state;
            Ok(MoveOutcome {
                accepted: false,
                rejection: Some(rejection),
                state: view,
            })
        }
    }
}

/// Handles the `ResetGame` command: replaces the game with a fresh one using
/// the configured cooldown, saves it and publishes it.
///
/// # Errors
///
/// Returns `DomainError::StoreUnavailable` if the fresh game cannot be saved,
/// or `DomainError::ConcurrencyConflict` if another server saved in between;
/// the previous game then stays current.
#[instrument(skip_all, fields(game_key = %settings.key, correlation_id = %command.correlation_id()))]
pub async fn handle_reset_game(
    command: &ResetGame,
    settings: &GameSettings,
    clock: &dyn Clock,
    store: &dyn StateStore,
    broadcaster: &dyn Broadcaster,
    cached: &mut GameState,
) -> Result<GameView, DomainError> {
    let key = settings.key.as_str();
    // Only the version matters here; a snapshot that no longer decodes must
    // not block the reset that replaces it.
    let version = store.load(key).await?.map_or(0, |s| s.version);
    let now = clock.now();
    let fresh = GameState::new(now, settings.move_cooldown_seconds);

    if let Err(e) = save_state(key, store, version, &fresh).await {
        warn!(error = %e, "reset not applied: state could not be saved");
        return Err(e);
    }
    let view = GameView::from_state(&fresh, now);
    *cached = fresh;
    publish(broadcaster, Topic::GameReset, &view);
    info!(command = ResetGame::NAME, "game reset");
    Ok(view)
}
