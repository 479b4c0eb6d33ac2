use core::fmt;
use std::collections::BTreeSet;

use crate::board::Cell;
use crate::error::AgentError;

/// The assertion "exactly `count` of `cells` are mines".
///
/// `count <= cells.len()` holds for every value of this type: the constructor checks it and
/// the mark mutators refuse any mark that would break it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sentence {
  cells: BTreeSet<Cell>,
  count: u32,
}

impl Sentence {
  pub fn new(cells: impl IntoIterator<Item = Cell>, count: u32) -> Result<Self, AgentError> {
    let cells: BTreeSet<Cell> = cells.into_iter().collect();
    if count as usize > cells.len() {
      return Err(AgentError::InvalidSentence {
        count,
        cells: cells.len(),
      });
    }
    Ok(Self { cells, count })
  }

  pub fn cells(&self) -> &BTreeSet<Cell> {
    &self.cells
  }

  pub fn count(&self) -> u32 {
    self.count
  }

  pub fn contains(&self, cell: Cell) -> bool {
    self.cells.contains(&cell)
  }

  /// A sentence without cells says nothing.
  pub fn is_resolved(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn known_mines(&self) -> BTreeSet<Cell> {
    if self.cells.len() == self.count as usize {
      self.cells.clone()
    } else {
      BTreeSet::new()
    }
  }

  pub fn known_safes(&self) -> BTreeSet<Cell> {
    if self.count == 0 {
      self.cells.clone()
    } else {
      BTreeSet::new()
    }
  }

  /// Returns whether `cell` was part of the sentence. Fails, leaving the sentence untouched,
  /// if the sentence has no mine left to give to `cell`.
  pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, AgentError> {
    if !self.cells.contains(&cell) {
      return Ok(false);
    }
    if self.count == 0 {
      return Err(AgentError::InconsistentKnowledge(format!(
        "{:?} is a mine but {:?} has none left",
        cell, self
      )));
    }
    self.cells.remove(&cell);
    self.count -= 1;
    Ok(true)
  }

  /// Returns whether `cell` was part of the sentence. Fails, leaving the sentence untouched,
  /// if every cell of the sentence has to be a mine.
  pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, AgentError> {
    if !self.cells.contains(&cell) {
      return Ok(false);
    }
    if self.count as usize == self.cells.len() {
      return Err(AgentError::InconsistentKnowledge(format!(
        "{:?} is safe but {:?} needs every cell as a mine",
        cell, self
      )));
    }
    self.cells.remove(&cell);
    Ok(true)
  }

  /// Subset-difference rule: if `subset.cells ⊆ self.cells`, the remaining cells hold exactly
  /// `self.count - subset.count` mines. Yields `None` when `subset` is not a subset or nothing
  /// remains.
  pub fn infer_from(&self, subset: &Sentence) -> Result<Option<Sentence>, AgentError> {
    if !subset.cells.is_subset(&self.cells) {
      return Ok(None);
    }
    let count = self.count.checked_sub(subset.count).ok_or_else(|| {
      AgentError::InconsistentKnowledge(format!("{:?} cannot be contained in {:?}", subset, self))
    })?;
    if subset.cells.len() == self.cells.len() {
      if count != 0 {
        return Err(AgentError::InconsistentKnowledge(format!(
          "{:?} and {:?} disagree on the same cells",
          subset, self
        )));
      }
      return Ok(None);
    }

    Sentence::new(self.cells.difference(&subset.cells).copied(), count).map(Some)
  }
}

impl fmt::Debug for Sentence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, cell) in self.cells.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{:?}", cell)?;
    }
    write!(f, "}} = {}", self.count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cells(list: &[(i32, i32)]) -> Vec<Cell> {
    list.iter().copied().map(Cell::from).collect()
  }

  #[test]
  fn single_cell_with_one_mine_is_a_mine() {
    let sentence = Sentence::new(cells(&[(0, 0)]), 1).unwrap();
    assert_eq!(sentence.known_mines(), BTreeSet::from([Cell::new(0, 0)]));
    assert!(sentence.known_safes().is_empty());
  }

  #[test]
  fn zero_count_means_all_safe() {
    let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
    assert_eq!(sentence.known_safes().len(), 2);
    assert!(sentence.known_mines().is_empty());
  }

  #[test]
  fn undecided_sentence_knows_nothing() {
    let sentence = Sentence::new(cells(&[(0, 0), (0, 1), (1, 1)]), 2).unwrap();
    assert!(sentence.known_safes().is_empty());
    assert!(sentence.known_mines().is_empty());
  }

  #[test]
  fn rejects_count_above_cells() {
    assert_eq!(
      Sentence::new(cells(&[(0, 0)]), 2),
      Err(AgentError::InvalidSentence { count: 2, cells: 1 })
    );
  }

  #[test]
  fn marking_shrinks_cells_and_count() {
    let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1), (1, 0)]), 1).unwrap();
    assert_eq!(sentence.mark_mine(Cell::new(0, 1)), Ok(true));
    assert_eq!(sentence.count(), 0);
    assert_eq!(sentence.cells().len(), 2);
    assert_eq!(sentence.mark_safe(Cell::new(0, 0)), Ok(true));
    assert_eq!(sentence.count(), 0);
    assert_eq!(sentence.cells().len(), 1);
  }

  #[test]
  fn marking_foreign_cell_is_noop() {
    let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
    let before = sentence.clone();
    assert_eq!(sentence.mark_mine(Cell::new(5, 5)), Ok(false));
    assert_eq!(sentence.mark_safe(Cell::new(5, 5)), Ok(false));
    assert_eq!(sentence, before);
  }

  #[test]
  fn mine_without_count_left_is_rejected() {
    let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
    let before = sentence.clone();
    assert!(matches!(
      sentence.mark_mine(Cell::new(0, 0)),
      Err(AgentError::InconsistentKnowledge(_))
    ));
    assert_eq!(sentence, before);
  }

  #[test]
  fn safe_cell_in_all_mine_sentence_is_rejected() {
    let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
    let before = sentence.clone();
    assert!(matches!(
      sentence.mark_safe(Cell::new(0, 0)),
      Err(AgentError::InconsistentKnowledge(_))
    ));
    assert_eq!(sentence, before);
  }

  #[test]
  fn equality_ignores_insertion_order() {
    let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
    let b = Sentence::new(cells(&[(0, 1), (0, 0)]), 1).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap());
  }

  #[test]
  fn subset_difference() {
    let superset = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
    let subset = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
    let derived = superset.infer_from(&subset).unwrap().unwrap();
    assert_eq!(derived, Sentence::new(cells(&[(0, 2)]), 0).unwrap());
    assert_eq!(subset.infer_from(&superset), Ok(None));
  }

  #[test]
  fn equal_sentences_derive_nothing() {
    let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
    assert_eq!(a.infer_from(&a.clone()), Ok(None));
  }

  #[test]
  fn conflicting_counts_are_reported() {
    let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
    let b = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
    assert!(matches!(a.infer_from(&b), Err(AgentError::InconsistentKnowledge(_))));
    assert!(matches!(b.infer_from(&a), Err(AgentError::InconsistentKnowledge(_))));
  }

  #[test]
  fn debug_lists_cells_row_major() {
    let sentence = Sentence::new(cells(&[(1, 0), (0, 2)]), 1).unwrap();
    assert_eq!(format!("{:?}", sentence), "{(0, 2), (1, 0)} = 1");
  }
}
