use core::fmt;
use std::collections::BTreeSet;

use crate::error::BoardError;
use crate::grid::{Grid, Pos};

/// What is known about an opened or committed cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CellValue {
  Mine,
  Count(u8),
}

impl CellValue {
  /// Decodes the `-1` / `0..=8` encoding used by screen readers.
  pub fn from_code(code: i8) -> Result<Self, BoardError> {
    match code {
      -1 => Ok(CellValue::Mine),
      0..=8 => Ok(CellValue::Count(code as u8)),
      _ => Err(BoardError::InvalidCount(code.unsigned_abs())),
    }
  }

  pub fn code(self) -> i8 {
    match self {
      CellValue::Mine => -1,
      CellValue::Count(count) => count as i8,
    }
  }

  pub fn count(self) -> Option<u8> {
    match self {
      CellValue::Mine => None,
      CellValue::Count(count) => Some(count),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Cell {
  pub value: Option<CellValue>,
  pub is_flagged: bool,
  /// Estimated mine likelihood, only meaningful while `value` is `None`.
  pub probability: f64,
}

impl Cell {
  pub fn is_unopened(&self) -> bool {
    self.value.is_none() && !self.is_flagged
  }

  pub fn count(&self) -> Option<u8> {
    self.value.and_then(CellValue::count)
  }
}

#[derive(Clone, PartialEq)]
pub struct Board {
  cells: Grid<Cell>,
  mines_found: BTreeSet<Pos>,
}

impl Board {
  pub fn new(rows: u32, cols: u32) -> Self {
    Self {
      cells: Grid::new(rows, cols, Cell::default()),
      mines_found: BTreeSet::new(),
    }
  }

  pub fn rows(&self) -> u32 {
    self.cells.rows()
  }

  pub fn cols(&self) -> u32 {
    self.cells.cols()
  }

  pub fn contains(&self, pos: Pos) -> bool {
    self.cells.contains(pos)
  }

  pub fn cell(&self, pos: Pos) -> Option<&Cell> {
    self.cells.get(pos)
  }

  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    self.cells.positions()
  }

  pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> {
    self.cells.enumerate()
  }

  /// The in-bounds Moore neighbourhood of `pos`, always in the same order.
  pub fn neighbours(&self, pos: Pos) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
    self.cells.neighbours(pos).map(move |pos| (pos, &self.cells[pos]))
  }

  pub fn mines_found(&self) -> &BTreeSet<Pos> {
    &self.mines_found
  }

  /// Cells that are neither opened nor committed as mines.
  pub fn unresolved(&self) -> impl Iterator<Item = Pos> + '_ {
    self.cells.enumerate().filter(|(_, cell)| cell.is_unopened()).map(|(pos, _)| pos)
  }

  pub fn is_resolved(&self) -> bool {
    self.unresolved().next().is_none()
  }

  /// The only way cell values change.
  ///
  /// Committing a mine flags the cell and records it in [`Board::mines_found`]. Committing a count
  /// onto a previously flagged cell withdraws the flag.
  pub fn update_cell(&mut self, pos: Pos, value: CellValue) -> Result<(), BoardError> {
    if let CellValue::Count(count) = value {
      if count > 8 {
        return Err(BoardError::InvalidCount(count));
      }
    }
    let (rows, cols) = (self.rows(), self.cols());
    let cell = self.cells.get_mut(pos).ok_or(BoardError::OutOfBounds {
      row: pos.row,
      col: pos.col,
      rows,
      cols,
    })?;
    cell.value = Some(value);
    match value {
      CellValue::Mine => {
        cell.is_flagged = true;
        self.mines_found.insert(pos);
      }
      CellValue::Count(_) => {
        cell.is_flagged = false;
        self.mines_found.remove(&pos);
      }
    }
    log::trace!("cell {:?} is now {:?}", pos, value);
    Ok(())
  }

  pub(crate) fn set_probability(&mut self, pos: Pos, probability: f64) {
    if let Some(cell) = self.cells.get_mut(pos) {
      cell.probability = probability;
    }
  }
}

impl fmt::Debug for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in 0..self.rows() {
      for col in 0..self.cols() {
        let cell = &self.cells[Pos::new(row as i32, col as i32)];
        match cell.value {
          _ if cell.is_flagged => write!(f, "F")?,
          None => write!(f, "#")?,
          Some(CellValue::Mine) => write!(f, "X")?,
          Some(CellValue::Count(0)) => write!(f, " ")?,
          Some(CellValue::Count(count)) => write!(f, "{}", count)?,
        }
      }
      writeln!(f)?;
    }

    Ok(())
  }
}
