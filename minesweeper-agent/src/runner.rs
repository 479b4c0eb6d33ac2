//! Drives an [`Agent`] against a [`Game`]: the agent proposes, the game reveals, and every
//! revealed field goes back to the agent as an observation.

use tracing::{debug, info, warn};

use crate::board::Cell;
use crate::error::{GameError, PlayError};
use crate::{Agent, Game};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Step {
  /// Opened a cell the agent had proven safe.
  Safe { cell: Cell, revealed: Vec<Cell> },
  /// Nothing was proven safe, so the agent guessed and survived.
  Guess { cell: Cell, revealed: Vec<Cell> },
  Exploded(Cell),
  NoMove,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
  Won,
  Lost(Cell),
  /// The agent ran out of moves before the game was won.
  Stuck,
}

/// Feeds fields that are already visible but unknown to the agent, e.g. a protected start
/// opened before the agent joined.
pub fn observe_visible(game: &Game, agent: &mut Agent) -> Result<(), PlayError> {
  for cell in game.board().positions() {
    if game.is_visible(cell) && !game.is_mine(cell) && !agent.moves_made().contains(&cell) {
      agent.record_observation(cell, game.nearby_mines(cell))?;
    }
  }
  Ok(())
}

pub fn step(game: &mut Game, agent: &mut Agent) -> Result<Step, PlayError> {
  let (cell, guessed) = match agent.propose_safe_move() {
    Some(cell) => (cell, false),
    None => match agent.propose_random_move() {
      Some(cell) => (cell, true),
      None => return Ok(Step::NoMove),
    },
  };

  let revealed = match game.open(cell) {
    Ok(revealed) => revealed,
    Err(GameError::Exploded(cell)) => {
      warn!(?cell, guessed, "opened a mine");
      return Ok(Step::Exploded(cell));
    }
    Err(err) => return Err(err.into()),
  };

  for &opened in &revealed {
    agent.record_observation(opened, game.nearby_mines(opened))?;
  }
  debug!(
    ?cell,
    guessed,
    revealed = revealed.len(),
    mines = agent.mines().len(),
    "move made"
  );

  Ok(if guessed {
    Step::Guess { cell, revealed }
  } else {
    Step::Safe { cell, revealed }
  })
}

pub fn play(game: &mut Game, agent: &mut Agent) -> Result<Outcome, PlayError> {
  observe_visible(game, agent)?;
  let mut guesses = 0;
  loop {
    if game.is_win() {
      info!(guesses, moves = agent.moves_made().len(), "game won");
      return Ok(Outcome::Won);
    }

    match step(game, agent)? {
      Step::Exploded(cell) => {
        info!(?cell, guesses, moves = agent.moves_made().len(), "game lost");
        return Ok(Outcome::Lost(cell));
      }
      Step::NoMove => {
        warn!(moves = agent.moves_made().len(), "no move left");
        return Ok(Outcome::Stuck);
      }
      Step::Guess { .. } => guesses += 1,
      Step::Safe { .. } => (),
    }
  }
}
