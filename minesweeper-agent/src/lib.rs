use core::fmt;
use std::collections::BTreeSet;

use board::{Board, BoardExplorer, Cell};
use rand::prelude::SliceRandom;
use rand::RngCore;

pub mod agent;
pub mod board;
pub mod error;
pub mod runner;
pub mod sentence;

pub use agent::Agent;
pub use error::{AgentError, GameError, PlayError};
pub use sentence::Sentence;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Field {
  Mine,
  Empty(u32),
}

impl Field {
  pub fn is_mine(self) -> bool {
    matches!(self, Field::Mine)
  }

  pub fn is_blank(self) -> bool {
    matches!(self, Field::Empty(0))
  }

  fn notify_mine(field: &mut Field) {
    if let Field::Empty(mines) = field {
      *mines += 1;
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Field::Mine => write!(f, "X"),
      Field::Empty(0) => write!(f, " "),
      Field::Empty(mines) => write!(f, "{}", mines),
    }
  }
}

pub type GameBoard = Board<Field>;
pub type ViewBoard = Board<bool>;

/// A board with mines placed and every empty field's neighbour count filled in.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GameSetup {
  board: GameBoard,
  mines: u32,
}

impl GameSetup {
  pub fn new(mines: &Board<bool>) -> Self {
    let mut board = GameBoard::new(mines.width, mines.height, Field::Empty(0));
    let mut count = 0;
    for (cell, &is_mine) in mines.enumerate() {
      if is_mine {
        count += 1;
        board[cell] = Field::Mine;
        for neighbour in cell.neighbours() {
          if let Some(field) = board.get_mut(neighbour) {
            Field::notify_mine(field);
          }
        }
      }
    }

    GameSetup { board, mines: count }
  }

  pub fn width(&self) -> u32 {
    self.board.width
  }

  pub fn height(&self) -> u32 {
    self.board.height
  }

  pub fn mines(&self) -> u32 {
    self.mines
  }
}

impl From<GameSetupBuilder> for GameSetup {
  fn from(builder: GameSetupBuilder) -> Self {
    Self::new(&builder.mines)
  }
}

impl fmt::Debug for GameSetup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (cell, field) in self.board.enumerate() {
      write!(f, "{}", field)?;
      if cell.col as u32 + 1 == self.width() {
        writeln!(f)?;
      }
    }

    Ok(())
  }
}

pub struct GameSetupBuilder {
  mines: Board<bool>,
  protected: Board<bool>,
  rng: Box<dyn RngCore>,
}

impl GameSetupBuilder {
  pub fn new(width: u32, height: u32) -> Self {
    Self::with_rng(width, height, Box::new(rand::thread_rng()))
  }

  pub fn with_rng(width: u32, height: u32, rng: Box<dyn RngCore>) -> Self {
    Self {
      mines: Board::new(width, height, false),
      protected: Board::new(width, height, false),
      rng,
    }
  }

  pub fn has_mine(&self, cell: Cell) -> bool {
    self.mines[cell]
  }

  pub fn set_mine(&mut self, cell: Cell) {
    assert!(!self.is_protected(cell));
    self.mines[cell] = true;
  }

  pub fn is_protected(&self, cell: Cell) -> bool {
    self.protected[cell]
  }

  pub fn protect(&mut self, cell: Cell) {
    self.mines[cell] = false;
    self.protected[cell] = true;
  }

  /// Protects the in-bounds cells of `cells`; the rest are ignored.
  pub fn protect_all(&mut self, cells: impl IntoIterator<Item = Cell>) {
    for cell in cells {
      if self.mines.contains(cell) {
        self.protect(cell);
      }
    }
  }

  /// Places `mines` more mines on free cells. Returns false if they did not fit.
  pub fn add_random_mines(&mut self, mut mines: u32) -> bool {
    let mut possible_cells: Vec<_> = self.mines.positions().collect();
    possible_cells.shuffle(&mut self.rng);

    while let Some(cell) = possible_cells.pop() {
      if mines == 0 {
        return true;
      }

      if self.is_protected(cell) || self.has_mine(cell) {
        continue;
      }

      self.set_mine(cell);
      mines -= 1;
    }

    mines == 0
  }
}

/// The environment: the hidden board plus which fields are visible.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Game {
  setup: GameSetup,
  view: ViewBoard,
}

impl Game {
  pub fn setup(&self) -> &GameSetup {
    &self.setup
  }

  pub fn board(&self) -> &GameBoard {
    &self.setup.board
  }

  pub fn width(&self) -> u32 {
    self.board().width
  }

  pub fn height(&self) -> u32 {
    self.board().height
  }

  pub fn mines(&self) -> u32 {
    self.setup.mines
  }

  pub fn is_mine(&self, cell: Cell) -> bool {
    self.board()[cell].is_mine()
  }

  /// Mines among the up to eight cells around `cell`.
  pub fn nearby_mines(&self, cell: Cell) -> u32 {
    self.board().get_around(cell).filter(|field| field.is_mine()).count() as u32
  }

  pub fn is_visible(&self, cell: Cell) -> bool {
    self.view[cell]
  }

  pub fn view(&self, cell: Cell) -> Option<Field> {
    match self.view.get(cell) {
      Some(true) => Some(self.board()[cell]),
      _ => None,
    }
  }

  /// Reveals `cell`, spreading through blank fields. Returns every field this call revealed.
  pub fn open(&mut self, cell: Cell) -> Result<Vec<Cell>, GameError> {
    if !self.board().contains(cell) {
      return Err(GameError::OutOfBounds {
        cell,
        width: self.width(),
        height: self.height(),
      });
    }
    if self.view[cell] {
      return Err(GameError::AlreadyOpen(cell));
    }
    if self.is_mine(cell) {
      self.view[cell] = true;
      return Err(GameError::Exploded(cell));
    }

    let mut opened = Vec::new();
    let mut explorer = BoardExplorer::from(self.board());
    explorer.enqueue(cell);

    while let Some(cell) = explorer.pop() {
      if self.view[cell] {
        continue;
      }
      self.view[cell] = true;
      opened.push(cell);
      if self.board()[cell].is_blank() {
        explorer.enqueue_all(cell.neighbours());
      }
    }

    Ok(opened)
  }

  /// All empty fields are visible.
  pub fn is_win(&self) -> bool {
    self
      .board()
      .enumerate()
      .all(|(cell, field)| field.is_mine() || self.view[cell])
  }

  /// `flags` are exactly the mines.
  pub fn won(&self, flags: &BTreeSet<Cell>) -> bool {
    flags.len() == self.mines() as usize
      && flags
        .iter()
        .all(|&cell| self.board().get(cell).is_some_and(|field| field.is_mine()))
  }
}

impl From<GameSetup> for Game {
  fn from(setup: GameSetup) -> Self {
    Self {
      view: ViewBoard::new(setup.width(), setup.height(), false),
      setup,
    }
  }
}

impl From<GameSetupBuilder> for Game {
  fn from(builder: GameSetupBuilder) -> Self {
    Self::from(GameSetup::from(builder))
  }
}

impl fmt::Debug for Game {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (cell, field) in self.board().enumerate() {
      if self.is_visible(cell) {
        write!(f, "{}", field)?;
      } else {
        write!(f, "░")?;
      }
      if cell.col as u32 + 1 == self.width() {
        writeln!(f)?;
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  fn builder(width: u32, height: u32) -> GameSetupBuilder {
    GameSetupBuilder::with_rng(width, height, Box::new(StdRng::seed_from_u64(3)))
  }

  fn game_with_mines(width: u32, height: u32, mines: &[(i32, i32)]) -> Game {
    let mut builder = builder(width, height);
    for &cell in mines {
      builder.set_mine(cell.into());
    }
    Game::from(builder)
  }

  #[test]
  fn counts_neighbouring_mines() {
    let game = game_with_mines(3, 3, &[(0, 0), (2, 2)]);
    assert_eq!(game.nearby_mines(Cell::new(1, 1)), 2);
    assert_eq!(game.nearby_mines(Cell::new(0, 2)), 0);
    assert_eq!(game.nearby_mines(Cell::new(1, 0)), 1);
    assert_eq!(game.board()[Cell::new(1, 1)], Field::Empty(2));
    assert_eq!(game.mines(), 2);
  }

  #[test]
  fn open_spreads_through_blanks() {
    let game_mines = [(2, 2)];
    let mut game = game_with_mines(3, 3, &game_mines);
    let opened = game.open(Cell::new(0, 0)).unwrap();
    assert_eq!(opened.len(), 8);
    assert!(!opened.contains(&Cell::new(2, 2)));
    assert!(game.is_win());
    assert_eq!(game.view(Cell::new(1, 1)), Some(Field::Empty(1)));
    assert_eq!(game.view(Cell::new(2, 2)), None);
  }

  #[test]
  fn open_numbered_field_reveals_only_it() {
    let mut game = game_with_mines(3, 3, &[(0, 0)]);
    assert_eq!(game.open(Cell::new(1, 1)), Ok(vec![Cell::new(1, 1)]));
    assert!(!game.is_win());
    assert_eq!(game.open(Cell::new(1, 1)), Err(GameError::AlreadyOpen(Cell::new(1, 1))));
  }

  #[test]
  fn open_mine_explodes() {
    let mut game = game_with_mines(2, 2, &[(1, 1)]);
    assert_eq!(game.open(Cell::new(1, 1)), Err(GameError::Exploded(Cell::new(1, 1))));
    assert!(matches!(game.open(Cell::new(2, 0)), Err(GameError::OutOfBounds { .. })));
  }

  #[test]
  fn won_requires_exact_flags() {
    let game = game_with_mines(3, 3, &[(0, 0), (2, 2)]);
    let mut flags: BTreeSet<Cell> = [Cell::new(0, 0)].into();
    assert!(!game.won(&flags));
    flags.insert(Cell::new(2, 2));
    assert!(game.won(&flags));
    flags.insert(Cell::new(1, 1));
    assert!(!game.won(&flags));
  }

  #[test]
  fn random_mines_respect_protection() {
    let mut builder = builder(4, 4);
    builder.protect_all(Cell::new(0, 0).with_neighbours());
    assert!(builder.add_random_mines(12));
    let game = Game::from(builder);
    assert_eq!(game.mines(), 12);
    assert!(!game.is_mine(Cell::new(0, 0)));
    assert!(!game.is_mine(Cell::new(1, 1)));
  }

  #[test]
  fn too_many_mines_do_not_fit() {
    let mut builder = builder(2, 2);
    builder.protect(Cell::new(0, 0));
    assert!(!builder.add_random_mines(4));
  }

  #[test]
  fn debug_hides_unopened_fields() {
    let mut game = game_with_mines(2, 1, &[(0, 1)]);
    game.open(Cell::new(0, 0)).unwrap();
    assert_eq!(format!("{:?}", game), "1░\n");
    assert_eq!(format!("{:?}", game.setup()), "1X\n");
  }
}
