use core::fmt;
use std::collections::BTreeSet;

use rand::prelude::SliceRandom;
use rand::RngCore;
use tracing::{debug, trace};

use crate::board::{BoardPositionIterator, Cell};
use crate::error::AgentError;
use crate::sentence::Sentence;

/// Knowledge-based player.
///
/// Every sentence in `knowledge` only ever mentions cells whose status is still unknown:
/// proven cells are removed from all sentences the moment they are proven, and new
/// sentences are reduced against the proven cells before they are inserted.
pub struct Agent {
  width: u32,
  height: u32,
  moves_made: BTreeSet<Cell>,
  safes: BTreeSet<Cell>,
  mines: BTreeSet<Cell>,
  knowledge: Vec<Sentence>,
  rng: Box<dyn RngCore>,
}

impl Agent {
  pub fn new(width: u32, height: u32) -> Self {
    Self::with_rng(width, height, Box::new(rand::thread_rng()))
  }

  pub fn with_rng(width: u32, height: u32, rng: Box<dyn RngCore>) -> Self {
    Self {
      width,
      height,
      moves_made: BTreeSet::new(),
      safes: BTreeSet::new(),
      mines: BTreeSet::new(),
      knowledge: Vec::new(),
      rng,
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn moves_made(&self) -> &BTreeSet<Cell> {
    &self.moves_made
  }

  pub fn safes(&self) -> &BTreeSet<Cell> {
    &self.safes
  }

  pub fn mines(&self) -> &BTreeSet<Cell> {
    &self.mines
  }

  pub fn knowledge(&self) -> &[Sentence] {
    &self.knowledge
  }

  pub fn contains(&self, cell: Cell) -> bool {
    cell.is_within(self.width, self.height)
  }

  fn check_bounds(&self, cell: Cell) -> Result<(), AgentError> {
    if self.contains(cell) {
      Ok(())
    } else {
      Err(AgentError::OutOfBounds {
        cell,
        width: self.width,
        height: self.height,
      })
    }
  }

  /// Records that `cell` was opened safely and has `count` mines around it, then derives
  /// everything that follows.
  ///
  /// A cell can only be observed once; a second observation is rejected without touching
  /// the knowledge base.
  pub fn record_observation(&mut self, cell: Cell, count: u32) -> Result<(), AgentError> {
    self.check_bounds(cell)?;
    if self.moves_made.contains(&cell) {
      return Err(AgentError::AlreadyObserved(cell));
    }
    let neighbourhood = Sentence::new(cell.neighbours().filter(|&n| self.contains(n)), count)?;

    debug!(?cell, count, "recording observation");
    self.moves_made.insert(cell);
    self.mark_safe(cell)?;
    self.insert_sentence(neighbourhood)?;
    self.saturate()
  }

  /// Adds a sentence learned from outside the board observations and saturates.
  pub fn add_sentence(&mut self, sentence: Sentence) -> Result<(), AgentError> {
    for &cell in sentence.cells() {
      self.check_bounds(cell)?;
    }
    self.insert_sentence(sentence)?;
    self.saturate()
  }

  pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, AgentError> {
    if self.safes.contains(&cell) {
      return Err(AgentError::Contradiction(cell));
    }
    if !self.mines.insert(cell) {
      return Ok(false);
    }

    debug!(?cell, "proven mine");
    for sentence in &mut self.knowledge {
      sentence.mark_mine(cell)?;
    }
    Ok(true)
  }

  pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, AgentError> {
    if self.mines.contains(&cell) {
      return Err(AgentError::Contradiction(cell));
    }
    if !self.safes.insert(cell) {
      return Ok(false);
    }

    debug!(?cell, "proven safe");
    for sentence in &mut self.knowledge {
      sentence.mark_safe(cell)?;
    }
    Ok(true)
  }

  /// Applies every fact the sentences imply until none is left, then drops sentences that
  /// became empty or duplicate. Returns whether any cell was newly proven.
  pub fn mark_if_possible(&mut self) -> Result<bool, AgentError> {
    let mut changed = false;
    loop {
      let mut mines = BTreeSet::new();
      let mut safes = BTreeSet::new();
      for sentence in &self.knowledge {
        mines.extend(sentence.known_mines());
        safes.extend(sentence.known_safes());
      }

      let mut progress = false;
      for cell in mines {
        progress |= self.mark_mine(cell)?;
      }
      for cell in safes {
        progress |= self.mark_safe(cell)?;
      }

      if !progress {
        break;
      }
      changed = true;
    }

    self.prune();
    Ok(changed)
  }

  /// One pass of the subset rule over every pair of sentences. The result is sorted and
  /// holds only sentences not yet in the knowledge base; nothing is inserted.
  pub fn infer_more_sentences(&self) -> Result<Vec<Sentence>, AgentError> {
    let mut inferred = BTreeSet::new();
    for (i, a) in self.knowledge.iter().enumerate() {
      for b in &self.knowledge[i + 1..] {
        for derived in [b.infer_from(a)?, a.infer_from(b)?].into_iter().flatten() {
          if !self.knowledge.contains(&derived) {
            inferred.insert(derived);
          }
        }
      }
    }
    Ok(inferred.into_iter().collect())
  }

  /// Known safe cell that has not been played yet, lowest in row-major order.
  pub fn propose_safe_move(&self) -> Option<Cell> {
    self
      .safes
      .iter()
      .copied()
      .find(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
  }

  /// Uniform choice among the cells neither played nor known to be mines.
  pub fn propose_random_move(&mut self) -> Option<Cell> {
    let candidates: Vec<Cell> = BoardPositionIterator::new(self.width, self.height)
      .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
      .collect();
    candidates.choose(&mut self.rng).copied()
  }

  pub fn propose_move(&mut self) -> Option<Cell> {
    match self.propose_safe_move() {
      Some(cell) => Some(cell),
      None => self.propose_random_move(),
    }
  }

  /// Strips proven cells off `sentence` and inserts it unless it is empty or already known.
  fn insert_sentence(&mut self, mut sentence: Sentence) -> Result<bool, AgentError> {
    let known: Vec<Cell> = sentence
      .cells()
      .iter()
      .copied()
      .filter(|cell| self.safes.contains(cell) || self.mines.contains(cell))
      .collect();
    for cell in known {
      if self.mines.contains(&cell) {
        sentence.mark_mine(cell)?;
      } else {
        sentence.mark_safe(cell)?;
      }
    }

    if sentence.is_resolved() || self.knowledge.contains(&sentence) {
      return Ok(false);
    }
    debug!(?sentence, "adding sentence");
    self.knowledge.push(sentence);
    Ok(true)
  }

  fn prune(&mut self) {
    let mut seen = BTreeSet::new();
    self
      .knowledge
      .retain(|sentence| !sentence.is_resolved() && seen.insert(sentence.clone()));
  }

  fn saturate(&mut self) -> Result<(), AgentError> {
    for pass in 1u32.. {
      self.mark_if_possible()?;
      let inferred = self.infer_more_sentences()?;
      trace!(
        pass,
        sentences = self.knowledge.len(),
        inferred = inferred.len(),
        "saturation pass"
      );
      if inferred.is_empty() {
        break;
      }
      for sentence in inferred {
        debug!(?sentence, "inferred sentence");
        self.knowledge.push(sentence);
      }
    }
    Ok(())
  }
}

impl fmt::Debug for Agent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in 0..self.height as i32 {
      for col in 0..self.width as i32 {
        let cell = Cell::new(row, col);
        if self.mines.contains(&cell) {
          write!(f, "X")?;
        } else if self.moves_made.contains(&cell) {
          write!(f, " ")?;
        } else if self.safes.contains(&cell) {
          write!(f, ".")?;
        } else {
          write!(f, "░")?;
        }
      }
      writeln!(f)?;
    }
    for sentence in &self.knowledge {
      writeln!(f, "{:?}", sentence)?;
    }

    Ok(())
  }
}
