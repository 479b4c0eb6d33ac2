use core::fmt;
use std::collections::VecDeque;
use std::ops::{Add, Index, IndexMut};

pub static NORTH: Cell = Cell::new(-1, 0);
pub static NORTH_EAST: Cell = Cell::new(-1, 1);
pub static EAST: Cell = Cell::new(0, 1);
pub static SOUTH_EAST: Cell = Cell::new(1, 1);
pub static SOUTH: Cell = Cell::new(1, 0);
pub static SOUTH_WEST: Cell = Cell::new(1, -1);
pub static WEST: Cell = Cell::new(0, -1);
pub static NORTH_WEST: Cell = Cell::new(-1, -1);
pub static CENTER: Cell = Cell::new(0, 0);

pub static DIRECTIONS: [Cell; 8] = [NORTH_WEST, NORTH, NORTH_EAST, WEST, EAST, SOUTH_WEST, SOUTH, SOUTH_EAST];
pub static CENTER_AND_DIRECTIONS: [Cell; 9] = [
  NORTH_WEST, NORTH, NORTH_EAST, WEST, CENTER, EAST, SOUTH_WEST, SOUTH, SOUTH_EAST,
];

/// A board coordinate. Orders row-major, so sets of cells iterate row by row.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
  pub row: i32,
  pub col: i32,
}

impl Cell {
  pub const fn new(row: i32, col: i32) -> Cell {
    Cell { row, col }
  }

  pub fn with_neighbours(self) -> impl Iterator<Item = Cell> {
    CENTER_AND_DIRECTIONS.iter().map(move |&dir| dir + self)
  }

  /// All cells within Chebyshev distance 1, excluding `self`. Not clipped to any board.
  pub fn neighbours(self) -> impl Iterator<Item = Cell> {
    DIRECTIONS.iter().map(move |&dir| dir + self)
  }

  pub fn is_within(self, width: u32, height: u32) -> bool {
    (0..width as i32).contains(&self.col) && (0..height as i32).contains(&self.row)
  }
}

impl fmt::Debug for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl From<(i32, i32)> for Cell {
  fn from((row, col): (i32, i32)) -> Self {
    Cell::new(row, col)
  }
}

impl Add<Cell> for Cell {
  type Output = Cell;

  fn add(self, rhs: Cell) -> Self::Output {
    Cell::new(self.row + rhs.row, self.col + rhs.col)
  }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board<T> {
  pub width: u32,
  pub height: u32,
  fields: Vec<T>,
}

impl<T> Board<T> {
  pub fn new(width: u32, height: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self {
      width,
      height,
      fields: vec![default; (width * height) as usize],
    }
  }

  fn cell_to_index(&self, cell: Cell) -> Option<usize> {
    if cell.is_within(self.width, self.height) {
      Some(cell.col as usize + cell.row as usize * self.width as usize)
    } else {
      None
    }
  }

  pub fn contains(&self, cell: Cell) -> bool {
    cell.is_within(self.width, self.height)
  }

  pub fn get(&self, cell: Cell) -> Option<&T> {
    self.cell_to_index(cell).and_then(|i| self.fields.get(i))
  }

  pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
    self.cell_to_index(cell).and_then(|i| self.fields.get_mut(i))
  }

  pub fn get_around(&self, cell: Cell) -> impl Iterator<Item = &T> {
    cell.neighbours().flat_map(|cell| self.get(cell))
  }

  pub fn positions(&self) -> BoardPositionIterator {
    BoardPositionIterator::new(self.width, self.height)
  }

  pub fn enumerate(&self) -> impl Iterator<Item = (Cell, &T)> {
    self.positions().zip(self.fields.iter())
  }
}

impl<T> Index<Cell> for Board<T> {
  type Output = T;

  fn index(&self, index: Cell) -> &Self::Output {
    self.get(index).unwrap_or_else(|| {
      panic!(
        "Cannot access cell {:?} on board with size {}x{}",
        index, self.width, self.height
      )
    })
  }
}

impl<T> IndexMut<Cell> for Board<T> {
  fn index_mut(&mut self, index: Cell) -> &mut T {
    let (width, height) = (self.width, self.height);
    self.get_mut(index).unwrap_or_else(|| {
      panic!(
        "Cannot mut-access cell {:?} on board with size {}x{}",
        index, width, height
      )
    })
  }
}

/// Walks every cell of a `width`x`height` board in row-major order.
pub struct BoardPositionIterator {
  next: Cell,
  width: i32,
  height: i32,
}

impl BoardPositionIterator {
  pub fn new(width: u32, height: u32) -> Self {
    let height = height as i32;
    Self {
      next: if width == 0 { Cell::new(height, 0) } else { Cell::new(0, 0) },
      width: width as i32,
      height,
    }
  }
}

impl Iterator for BoardPositionIterator {
  type Item = Cell;

  fn next(&mut self) -> Option<Self::Item> {
    let cell = &mut self.next;
    if cell.row >= self.height {
      None
    } else {
      let result = *cell;
      cell.col += 1;
      if cell.col >= self.width {
        cell.col = 0;
        cell.row += 1;
      }
      Some(result)
    }
  }
}

/// Breadth-first queue that hands out every in-bounds cell at most once.
#[derive(Clone)]
pub struct BoardExplorer {
  queue: VecDeque<Cell>,
  visited: Board<bool>,
}

impl BoardExplorer {
  pub fn enqueue(&mut self, cell: Cell) {
    if let Some(field) = self.visited.get_mut(cell) {
      if !*field {
        *field = true;
        self.queue.push_back(cell);
      }
    }
  }

  pub fn enqueue_all(&mut self, all: impl IntoIterator<Item = Cell>) {
    for cell in all {
      self.enqueue(cell);
    }
  }

  pub fn pop(&mut self) -> Option<Cell> {
    self.queue.pop_front()
  }
}

impl<T> From<&Board<T>> for BoardExplorer {
  fn from(board: &Board<T>) -> Self {
    Self {
      queue: VecDeque::new(),
      visited: Board::new(board.width, board.height, false),
    }
  }
}
