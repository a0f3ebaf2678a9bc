//! Risk estimate for when no deduction applies.
//!
//! Each numbered cell proposes `remaining / unopened` for its unopened neighbours, halved (by
//! default) when the constraint is not saturated. A cell keeps the worst proposal it receives. The
//! result is blended with the global mine density.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::Board;
use crate::config::SolverConfig;
use crate::deduce::{constraints, Conclusion};
use crate::grid::Pos;

const TIE_TOLERANCE: f64 = 1e-12;

/// Mines per unopened cell across the whole board.
pub fn global_density(board: &Board, total_mines: Option<u32>) -> f64 {
  let unopened = board.unresolved().count();
  if unopened == 0 {
    return 0.0;
  }
  let found = board.mines_found().len();
  let mines = match total_mines {
    Some(total) => (total as usize).saturating_sub(found),
    None => found,
  };
  (mines as f64 / unopened as f64).min(1.0)
}

/// Stores a mine probability on every unopened cell and returns the cells with the lowest one.
///
/// The returned set is ordered by row, then column, so its first entry is the canonical guess. It is
/// empty only when no unopened cell is left.
pub fn estimate_probabilities(board: &mut Board, config: &SolverConfig) -> BTreeSet<Pos> {
  let mut local: BTreeMap<Pos, f64> = board.unresolved().map(|pos| (pos, 0.0)).collect();
  let mut floored = BTreeSet::new();

  for constraint in constraints(board) {
    if constraint.unopened.is_empty() {
      continue;
    }
    if constraint.conclusion() == Conclusion::NeighboursAreNotMines {
      floored.extend(constraint.unopened.iter().copied());
    }
    let remaining = constraint.remaining();
    if constraint.count == 0 || remaining < 0 {
      continue;
    }

    let unopened = constraint.unopened.len() as f64;
    let weight = if remaining == 0 || remaining as usize == constraint.unopened.len() {
      1.0
    } else {
      config.uncertain_weight
    };
    let candidate = remaining as f64 / unopened * weight;
    for pos in &constraint.unopened {
      if let Some(probability) = local.get_mut(pos) {
        *probability = probability.max(candidate);
      }
    }
  }

  let global = global_density(board, config.total_mines);
  let mut minimum = f64::INFINITY;
  let mut estimates = Vec::with_capacity(local.len());
  for (pos, local_probability) in local {
    let mut probability = config.local_weight * local_probability + (1.0 - config.local_weight) * global;
    if floored.contains(&pos) {
      probability = probability.max(config.safe_floor);
    }
    let probability = probability.clamp(0.0, 1.0);
    minimum = minimum.min(probability);
    board.set_probability(pos, probability);
    estimates.push((pos, probability));
  }

  let candidates: BTreeSet<Pos> = estimates
    .into_iter()
    .filter(|&(_, probability)| probability - minimum <= TIE_TOLERANCE)
    .map(|(pos, _)| pos)
    .collect();
  log::debug!(
    "lowest mine probability {:.3} at {} cells, global density {:.3}",
    minimum,
    candidates.len(),
    global
  );
  candidates
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::board::CellValue;

  fn probability(board: &Board, row: i32, col: i32) -> f64 {
    board.cell(Pos::new(row, col)).unwrap().probability
  }

  #[test]
  fn blank_board_is_uniform() {
    let mut board = Board::new(3, 3);
    let candidates = estimate_probabilities(&mut board, &SolverConfig::default());
    assert_eq!(candidates.len(), 9);
    assert_eq!(candidates.iter().next(), Some(&Pos::new(0, 0)));
  }

  #[test]
  fn worst_constraint_wins() {
    // 1 # #
    // # # #
    // # # 2
    let mut board = Board::new(3, 3);
    board.update_cell(Pos::new(0, 0), CellValue::Count(1)).unwrap();
    board.update_cell(Pos::new(2, 2), CellValue::Count(2)).unwrap();
    let config = SolverConfig::default();
    let candidates = estimate_probabilities(&mut board, &config);

    // (1, 1) sees 1/3 * 0.5 from the top left and 2/3 * 0.5 from the bottom right.
    let expected = 0.9 * (2.0 / 3.0 * 0.5);
    assert!((probability(&board, 1, 1) - expected).abs() < 1e-9);
    assert!((probability(&board, 0, 1) - 0.9 * (1.0 / 3.0 * 0.5)).abs() < 1e-9);
    assert_eq!(candidates, BTreeSet::from([Pos::new(0, 2), Pos::new(2, 0)]));
    assert_eq!(probability(&board, 0, 2), 0.0);
  }

  #[test]
  fn global_density_counts_found_mines() {
    let mut board = Board::new(2, 2);
    board.update_cell(Pos::new(0, 0), CellValue::Mine).unwrap();
    assert!((global_density(&board, None) - 1.0 / 3.0).abs() < 1e-9);
    assert!((global_density(&board, Some(3)) - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(global_density(&board, Some(0)), 0.0);
  }

  #[test]
  fn unconstrained_cells_get_blended_density() {
    let mut board = Board::new(1, 4);
    board.update_cell(Pos::new(0, 0), CellValue::Mine).unwrap();
    let config = SolverConfig {
      total_mines: Some(2),
      ..SolverConfig::default()
    };
    let candidates = estimate_probabilities(&mut board, &config);
    assert_eq!(candidates.len(), 3);
    assert!((probability(&board, 0, 3) - 0.1 / 3.0).abs() < 1e-9);
  }

  #[test]
  fn saturated_safe_neighbours_are_floored() {
    let mut board = Board::new(1, 3);
    board.update_cell(Pos::new(0, 0), CellValue::Count(0)).unwrap();
    let config = SolverConfig::default();
    let candidates = estimate_probabilities(&mut board, &config);
    assert_eq!(probability(&board, 0, 1), config.safe_floor);
    assert_eq!(candidates, BTreeSet::from([Pos::new(0, 2)]));
  }

  #[test]
  fn no_unopened_cells_means_no_candidates() {
    let mut board = Board::new(1, 2);
    board.update_cell(Pos::new(0, 0), CellValue::Count(1)).unwrap();
    board.update_cell(Pos::new(0, 1), CellValue::Mine).unwrap();
    assert!(estimate_probabilities(&mut board, &SolverConfig::default()).is_empty());
  }
}
