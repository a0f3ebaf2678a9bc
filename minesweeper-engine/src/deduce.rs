//! Single-constraint deduction.
//!
//! Every rule here looks at exactly one numbered cell and its neighbourhood. No subset reasoning
//! across constraints is done, so each pass is linear in the board size.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::{Board, CellValue};
use crate::grid::Pos;

/// The local view of a numbered cell.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Constraint {
  pub pos: Pos,
  pub count: u8,
  pub flagged: u8,
  /// Unopened, unflagged neighbours in neighbourhood order.
  pub unopened: Vec<Pos>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Conclusion {
  Unconclusive,
  NeighboursAreMines,
  NeighboursAreNotMines,
}

use Conclusion::*;

impl Constraint {
  pub fn at(board: &Board, pos: Pos) -> Option<Constraint> {
    let count = board.cell(pos)?.count()?;
    let mut flagged = 0;
    let mut unopened = Vec::new();
    for (neighbour_pos, neighbour) in board.neighbours(pos) {
      if neighbour.is_flagged {
        flagged += 1;
      } else if neighbour.value.is_none() {
        unopened.push(neighbour_pos);
      }
    }
    Some(Constraint {
      pos,
      count,
      flagged,
      unopened,
    })
  }

  /// Mines still to be placed among [`Constraint::unopened`]. Negative when over-flagged.
  pub fn remaining(&self) -> i32 {
    i32::from(self.count) - i32::from(self.flagged)
  }

  pub fn conclusion(&self) -> Conclusion {
    if self.unopened.is_empty() {
      Unconclusive
    } else if self.count == 0 || self.remaining() == 0 {
      NeighboursAreNotMines
    } else if self.remaining() == self.unopened.len() as i32 {
      NeighboursAreMines
    } else {
      Unconclusive
    }
  }
}

/// Every numbered cell on the board, as a constraint, in row-major order.
pub fn constraints(board: &Board) -> impl Iterator<Item = Constraint> + '_ {
  board.positions().filter_map(move |pos| Constraint::at(board, pos))
}

/// Finds mines forced by a single numbered cell and commits them to the board.
///
/// Only mines that were not in [`Board::mines_found`] before the call are returned, so a second
/// call without new information returns nothing.
pub fn find_certain_mines(board: &mut Board) -> BTreeSet<Pos> {
  let mut mines = BTreeSet::new();
  for constraint in constraints(board) {
    if constraint.count > 0 && constraint.conclusion() == NeighboursAreMines {
      log::debug!(
        "{:?} shows {} with {} flagged, so {:?} are mines",
        constraint.pos,
        constraint.count,
        constraint.flagged,
        constraint.unopened
      );
      mines.extend(constraint.unopened);
    }
  }

  mines.retain(|pos| !board.mines_found().contains(pos));
  mines.retain(|&pos| board.update_cell(pos, CellValue::Mine).is_ok());
  mines
}

/// Finds every unopened cell that a single numbered cell proves safe.
///
/// Recomputed from scratch on every call.
pub fn find_safe_moves(board: &Board) -> BTreeSet<Pos> {
  let mut safe = BTreeSet::new();
  for constraint in constraints(board) {
    if constraint.conclusion() == NeighboursAreNotMines {
      log::debug!(
        "{:?} shows {} with {} flagged, so {:?} are safe",
        constraint.pos,
        constraint.count,
        constraint.flagged,
        constraint.unopened
      );
      safe.extend(constraint.unopened);
    }
  }
  safe
}

/// Mines not yet in [`Board::mines_found`], or `None` when more were found than exist.
fn mines_left(board: &Board, total_mines: u32) -> Option<usize> {
  (total_mines as usize).checked_sub(board.mines_found().len())
}

/// Commits every unresolved cell as a mine when exactly that many mines are still missing.
///
/// Covers mines that no numbered cell touches, such as a mine walled in by other mines.
pub fn find_mines_by_count(board: &mut Board, total_mines: u32) -> BTreeSet<Pos> {
  let unresolved: BTreeSet<Pos> = board.unresolved().collect();
  if unresolved.is_empty() || mines_left(board, total_mines) != Some(unresolved.len()) {
    return BTreeSet::new();
  }
  log::debug!("the last {} mines must be {:?}", unresolved.len(), unresolved);
  unresolved
    .into_iter()
    .filter(|&pos| board.update_cell(pos, CellValue::Mine).is_ok())
    .collect()
}

/// Every unresolved cell once all `total_mines` are found.
pub fn find_safe_by_count(board: &Board, total_mines: u32) -> BTreeSet<Pos> {
  if mines_left(board, total_mines) != Some(0) {
    return BTreeSet::new();
  }
  board.unresolved().collect()
}

/// Heuristic, not a certainty: unopened cells touched by at least `min_overlaps` constraints that
/// still miss mines.
///
/// Never feeds [`find_certain_mines`]. Useful only to steer a guess away from crowded cells.
pub fn overlap_suspects(board: &Board, min_overlaps: usize) -> BTreeSet<Pos> {
  let mut overlaps = BTreeMap::<Pos, usize>::new();
  for constraint in constraints(board) {
    if constraint.remaining() > 0 {
      for pos in constraint.unopened {
        *overlaps.entry(pos).or_default() += 1;
      }
    }
  }
  overlaps
    .into_iter()
    .filter(|&(_, count)| count >= min_overlaps.max(1))
    .map(|(pos, _)| pos)
    .collect()
}
