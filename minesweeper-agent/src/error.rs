use thiserror::Error;

use crate::board::Cell;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
  #[error("cell {cell:?} lies outside the {width}x{height} board")]
  OutOfBounds { cell: Cell, width: u32, height: u32 },

  #[error("cell {0:?} has already been observed")]
  AlreadyObserved(Cell),

  #[error("sentence claims {count} mines among {cells} cells")]
  InvalidSentence { count: u32, cells: usize },

  #[error("cell {0:?} was proven both safe and a mine")]
  Contradiction(Cell),

  #[error("observations are inconsistent: {0}")]
  InconsistentKnowledge(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
  #[error("cell {cell:?} lies outside the {width}x{height} board")]
  OutOfBounds { cell: Cell, width: u32, height: u32 },

  #[error("cell {0:?} is already open")]
  AlreadyOpen(Cell),

  #[error("opened a mine at {0:?}")]
  Exploded(Cell),
}

/// Failure of the loop that lets an agent play a game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayError {
  #[error(transparent)]
  Agent(#[from] AgentError),

  #[error(transparent)]
  Game(#[from] GameError),
}
