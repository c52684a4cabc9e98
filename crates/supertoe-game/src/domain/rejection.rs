//! Move rejections: rule violations reported back to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::board::GridIndex;

/// Why a move failed board validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidMoveReason {
    /// A global winner has been decided.
    #[error("the game is over")]
    GameOver,

    /// The target sub-board was already won or drawn.
    #[error("sub-board {board} is already decided")]
    BoardDecided {
        /// The decided sub-board.
        board: GridIndex,
    },

    /// The target cell already holds a mark.
    #[error("cell {cell} of sub-board {board} is already taken")]
    CellOccupied {
        /// The sub-board.
        board: GridIndex,
        /// The occupied cell.
        cell: GridIndex,
    },

    /// The move targets a sub-board other than the active one.
    #[error("the next move must be played in sub-board {required}")]
    WrongBoard {
        /// The sub-board that must be played.
        required: GridIndex,
    },
}

/// A move the rules engine refused. No state changes on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum MoveRejection {
    /// The cooldown since the last successful move has not elapsed.
    #[error("Not time for the next move yet")]
    TooSoon {
        /// Earliest instant at which a move is accepted.
        next_move_at: DateTime<Utc>,
    },

    /// The move breaks a board rule.
    #[error("Invalid move: {0}")]
    InvalidMove(InvalidMoveReason),
}
