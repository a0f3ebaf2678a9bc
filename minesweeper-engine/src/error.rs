use thiserror::Error;

use crate::grid::Pos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
  #[error("position ({row}, {col}) is outside of the {rows}x{cols} board")]
  OutOfBounds { row: i32, col: i32, rows: u32, cols: u32 },
  #[error("a cell cannot border {0} mines")]
  InvalidCount(u8),
}

/// Faults that abort a solve run. Mine hits and exhausted budgets are outcomes, see [`crate::solve::SolveOutcome`].
#[derive(Debug, Error)]
pub enum SolveError {
  #[error(transparent)]
  Board(#[from] BoardError),
}

/// Failures a tile source or move sink may report. The engine never propagates them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerceptionError {
  #[error("tile at {0:?} could not be read")]
  UnreadableTile(Pos),
  #[error("input device failure: {0}")]
  Io(String),
}
