//! Routes for playing the game.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use supertoe_core::command::CorrelationId;
use supertoe_game::application::query_handlers::GameView;
use supertoe_game::domain::commands::{PlaceMark, ResetGame};
use supertoe_game::domain::rejection::MoveRejection;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /move.
///
/// Fields are optional so that a missing value is reported as a malformed
/// request rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// The mark to place, `"X"` or `"O"`.
    #[serde(alias = "mark")]
    pub team: Option<String>,
    /// Target sub-board, 0 through 8.
    pub board: Option<i64>,
    /// Target cell within the sub-board, 0 through 8.
    pub cell: Option<i64>,
}

/// Response body for POST /move.
#[derive(Debug, Serialize)]
pub struct MoveResponse {
    /// Whether the move was committed.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Structured rejection, present only when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<MoveRejection>,
    /// The game after the attempt.
    pub game: GameView,
}

/// Response body for POST /reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Always true; failures are reported as errors.
    pub success: bool,
    /// The fresh game.
    pub game: GameView,
}

/// GET /game
#[instrument(skip(state))]
async fn get_game(State(state): State<AppState>) -> Result<Json<GameView>, ApiError> {
    Ok(Json(state.game.get_state().await?))
}

/// POST /move
#[instrument(skip(state, request), fields(board = ?request.board, cell = ?request.cell))]
async fn make_move(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let command = PlaceMark::parse(
        CorrelationId::new(),
        request.team.as_deref(),
        request.board,
        request.cell,
    )?;

    info!(correlation_id = %command.correlation_id, "handling place_mark command");

    let outcome = state.game.attempt_move(&command).await?;
    let message = match &outcome.rejection {
        Some(rejection) => rejection.to_string(),
        None => "Move successful".to_owned(),
    };

    Ok(Json(MoveResponse {
        success: outcome.accepted,
        message,
        reason: outcome.rejection,
        game: outcome.state,
    }))
}

/// POST /reset
#[instrument(skip(state))]
async fn reset_game(State(state): State<AppState>) -> Result<Json<ResetResponse>, ApiError> {
    let command = ResetGame {
        correlation_id: CorrelationId::new(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset_game command");

    let game = state.game.reset_game(&command).await?;

    Ok(Json(ResetResponse {
        success: true,
        game,
    }))
}

/// Returns the router for game play.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/game", get(get_game))
        .route("/move", post(make_move))
        .route("/reset", post(reset_game))
}
