//! Commands accepted by the game service.

use supertoe_core::command::{Command, CorrelationId};
use supertoe_core::error::DomainError;

use super::board::{GridIndex, Mark};

/// Command to place a mark at `(board, cell)`.
///
/// Construct with [`PlaceMark::parse`] to validate untrusted input; an
/// existing `PlaceMark` always holds in-range indices and a known mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceMark {
    /// The correlation ID for tracing.
    pub correlation_id: CorrelationId,
    /// The mark to place.
    pub mark: Mark,
    /// Target sub-board.
    pub board: GridIndex,
    /// Target cell within the sub-board.
    pub cell: GridIndex,
}

impl PlaceMark {
    /// Builds a command from raw request fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedRequest` if the mark is missing or not
    /// `X`/`O`, or if either index is missing or outside `0..=8`.
    pub fn parse(
        correlation_id: CorrelationId,
        mark: Option<&str>,
        board: Option<i64>,
        cell: Option<i64>,
    ) -> Result<Self, DomainError> {
        let mark = mark
            .ok_or_else(|| DomainError::MalformedRequest("missing mark".to_owned()))?
            .parse::<Mark>()
            .map_err(|e| DomainError::MalformedRequest(e.to_string()))?;
        let board = parse_index("board", board)?;
        let cell = parse_index("cell", cell)?;

        Ok(Self {
            correlation_id,
            mark,
            board,
            cell,
        })
    }
}

fn parse_index(field: &str, raw: Option<i64>) -> Result<GridIndex, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::MalformedRequest(format!("missing {field}")))?;
    GridIndex::try_from(raw).map_err(|e| DomainError::MalformedRequest(format!("{field}: {e}")))
}

impl Command for PlaceMark {
    const NAME: &'static str = "game.place_mark";

    fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

/// Command to discard the current game and start a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGame {
    /// The correlation ID for tracing.
    pub correlation_id: CorrelationId,
}

impl Command for ResetGame {
    const NAME: &'static str = "game.reset";

    fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}
