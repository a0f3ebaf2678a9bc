use core::fmt;
use std::collections::VecDeque;
use std::ops::{Add, Index, IndexMut};

use serde::{Deserialize, Serialize};

pub static NORTH: Pos = Pos::new(-1, 0);
pub static NORTH_EAST: Pos = Pos::new(-1, 1);
pub static EAST: Pos = Pos::new(0, 1);
pub static SOUTH_EAST: Pos = Pos::new(1, 1);
pub static SOUTH: Pos = Pos::new(1, 0);
pub static SOUTH_WEST: Pos = Pos::new(1, -1);
pub static WEST: Pos = Pos::new(0, -1);
pub static NORTH_WEST: Pos = Pos::new(-1, -1);

/// Moore neighbourhood offsets in reading order.
pub static DIRECTIONS: [Pos; 8] = [NORTH_WEST, NORTH, NORTH_EAST, WEST, EAST, SOUTH_WEST, SOUTH, SOUTH_EAST];

/// A cell coordinate. Orders by row, then column.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
  pub row: i32,
  pub col: i32,
}

impl Pos {
  pub const fn new(row: i32, col: i32) -> Pos {
    Pos { row, col }
  }

  /// All eight neighbours, including the ones outside of any grid.
  pub fn neighbours(self) -> impl Iterator<Item = Pos> {
    DIRECTIONS.iter().map(move |&dir| dir + self)
  }
}

impl fmt::Debug for Pos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl Add<Pos> for Pos {
  type Output = Pos;

  fn add(self, rhs: Pos) -> Self::Output {
    Pos::new(self.row + rhs.row, self.col + rhs.col)
  }
}

/// Fixed-size row-major storage addressed by [`Pos`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
  rows: u32,
  cols: u32,
  values: Vec<T>,
}

impl<T> Grid<T> {
  pub fn new(rows: u32, cols: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self {
      rows,
      cols,
      values: vec![default; rows as usize * cols as usize],
    }
  }

  pub fn rows(&self) -> u32 {
    self.rows
  }

  pub fn cols(&self) -> u32 {
    self.cols
  }

  pub fn contains(&self, pos: Pos) -> bool {
    self.offset(pos).is_some()
  }

  fn offset(&self, pos: Pos) -> Option<usize> {
    let row = u32::try_from(pos.row).ok().filter(|&row| row < self.rows)?;
    let col = u32::try_from(pos.col).ok().filter(|&col| col < self.cols)?;
    Some(row as usize * self.cols as usize + col as usize)
  }

  pub fn get(&self, pos: Pos) -> Option<&T> {
    let i = self.offset(pos)?;
    self.values.get(i)
  }

  pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
    let i = self.offset(pos)?;
    self.values.get_mut(i)
  }

  /// In-bounds neighbours of `pos`, in [`DIRECTIONS`] order.
  pub fn neighbours(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
    pos.neighbours().filter(move |&pos| self.contains(pos))
  }

  /// Every position, row by row.
  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    let cols = self.cols as i32;
    (0..self.rows as i32).flat_map(move |row| (0..cols).map(move |col| Pos::new(row, col)))
  }

  pub fn enumerate(&self) -> impl Iterator<Item = (Pos, &T)> {
    self.positions().zip(self.values.iter())
  }
}

impl<T> Index<Pos> for Grid<T> {
  type Output = T;

  fn index(&self, pos: Pos) -> &T {
    match self.offset(pos) {
      Some(i) => &self.values[i],
      None => panic!("{:?} lies outside a {}x{} grid", pos, self.rows, self.cols),
    }
  }
}

impl<T> IndexMut<Pos> for Grid<T> {
  fn index_mut(&mut self, pos: Pos) -> &mut T {
    match self.offset(pos) {
      Some(i) => &mut self.values[i],
      None => panic!("{:?} lies outside a {}x{} grid", pos, self.rows, self.cols),
    }
  }
}

/// Breadth-first work queue that hands out every in-bounds position at most once.
#[derive(Clone)]
pub struct GridExplorer {
  queue: VecDeque<Pos>,
  visited: Grid<bool>,
}

impl GridExplorer {
  pub fn new(rows: u32, cols: u32) -> Self {
    Self {
      queue: VecDeque::new(),
      visited: Grid::new(rows, cols, false),
    }
  }

  /// Marks `pos` visited without queueing it.
  pub fn visit(&mut self, pos: Pos) -> bool {
    match self.visited.get_mut(pos) {
      Some(field) if !*field => {
        *field = true;
        true
      }
      _ => false,
    }
  }

  pub fn enqueue(&mut self, pos: Pos) -> bool {
    if self.visit(pos) {
      self.queue.push_back(pos);
      return true;
    }
    false
  }

  pub fn enqueue_all(&mut self, all: impl IntoIterator<Item = Pos>) {
    for pos in all {
      self.enqueue(pos);
    }
  }

  pub fn is_visited(&self, pos: Pos) -> bool {
    self.visited.get(pos).copied().unwrap_or(false)
  }

  pub fn pop(&mut self) -> Option<Pos> {
    self.queue.pop_front()
  }
}

impl<T> From<&Grid<T>> for GridExplorer {
  fn from(grid: &Grid<T>) -> Self {
    Self::new(grid.rows, grid.cols)
  }
}
