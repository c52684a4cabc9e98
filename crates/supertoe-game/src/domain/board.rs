//! Board primitives: marks, grid indices, sub-board results and line detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of positions in a 3×3 grid.
pub const GRID_SIZE: usize = 9;

/// The eight winning lines of a 3×3 grid: rows, then columns, then diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// A symbol placed on the board. Marks carry no turn ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The symbol shown to clients.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when parsing a [`Mark`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized mark {0:?}; expected \"X\" or \"O\"")]
pub struct ParseMarkError(String);

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" | "x" => Ok(Self::X),
            "O" | "o" => Ok(Self::O),
            other => Err(ParseMarkError(other.to_owned())),
        }
    }
}

/// A position within a 3×3 grid, guaranteed to be in `0..9`.
///
/// Used both for the sub-board index and for the cell index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridIndex(u8);

/// Error returned when a raw integer is not a valid [`GridIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {0} is outside 0..=8")]
pub struct IndexOutOfRange(pub i64);

impl GridIndex {
    /// All nine indices in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..9u8).map(Self)
    }

    /// Returns the index as a `usize` for array access.
    #[must_use]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<i64> for GridIndex {
    type Error = IndexOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| usize::from(*v) < GRID_SIZE)
            .map(Self)
            .ok_or(IndexOutOfRange(value))
    }
}

impl TryFrom<u8> for GridIndex {
    type Error = IndexOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<GridIndex> for u8 {
    fn from(index: GridIndex) -> Self {
        index.0
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of one sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubBoardResult {
    /// Still playable.
    #[default]
    Undecided,
    /// Three in a line for this mark.
    Won(Mark),
    /// Full without a line.
    Draw,
}

impl SubBoardResult {
    /// Returns `true` while the sub-board can still be played.
    #[must_use]
    pub fn is_undecided(self) -> bool {
        self == Self::Undecided
    }

    /// The symbol shown to clients: empty, the winning mark, or `D`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Undecided => "",
            Self::Won(mark) => mark.symbol(),
            Self::Draw => "D",
        }
    }
}

/// Returns `true` if every position of any of the eight lines equals `target`.
///
/// Shared by sub-board detection (over cells) and global detection (over
/// sub-board results).
pub fn has_line<T: PartialEq>(values: &[T; GRID_SIZE], target: &T) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&i| values[i] == *target))
}
