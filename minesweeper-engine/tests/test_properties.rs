//! Property-based tests for deduction, flood fill and the probability estimate.

use std::collections::HashMap;

use proptest::prelude::*;

use minesweeper_engine::deduce::{find_certain_mines, find_safe_moves};
use minesweeper_engine::estimate::estimate_probabilities;
use minesweeper_engine::flood::flood_fill;
use minesweeper_engine::grid::Grid;
use minesweeper_engine::sim::{Field, SimulatedGame};
use minesweeper_engine::{Board, CellValue, Pos, SolverConfig, TileReading, TileSource};

/// A hidden layout together with the cells the player has already opened.
#[derive(Debug, Clone)]
struct Scenario {
  rows: u32,
  cols: u32,
  mines: Vec<bool>,
  opened: Vec<bool>,
}

impl Scenario {
  fn game(&self) -> SimulatedGame {
    let mut layout = Grid::new(self.rows, self.cols, false);
    for (i, pos) in layout.positions().collect::<Vec<_>>().into_iter().enumerate() {
      layout[pos] = self.mines[i];
    }
    SimulatedGame::new(&layout)
  }

  /// The board a player would hold: opened safe cells carry their counts.
  fn board(&self, game: &SimulatedGame) -> Board {
    let mut board = Board::new(self.rows, self.cols);
    let positions: Vec<_> = board.positions().collect();
    for (i, pos) in positions.into_iter().enumerate() {
      if let (true, Some(Field::Empty(count))) = (self.opened[i], game.field(pos)) {
        board.update_cell(pos, CellValue::Count(count)).unwrap();
      }
    }
    board
  }
}

fn scenario_strategy() -> impl Strategy<Value = Scenario> {
  (1..7u32, 1..7u32).prop_flat_map(|(rows, cols)| {
    let n = (rows * cols) as usize;
    (
      prop::collection::vec(prop::bool::weighted(0.2), n),
      prop::collection::vec(prop::bool::weighted(0.5), n),
    )
      .prop_map(move |(mines, opened)| Scenario {
        rows,
        cols,
        mines,
        opened,
      })
  })
}

/// Reads the true layout, counting how often each tile is asked for.
struct CountingGame {
  game: SimulatedGame,
  requests: HashMap<Pos, usize>,
}

impl TileSource for CountingGame {
  fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading> {
    *self.requests.entry(pos).or_default() += 1;
    Ok(match self.game.field(pos) {
      Some(Field::Empty(count)) => TileReading::Number(count),
      Some(Field::Mine) => TileReading::Mine,
      None => anyhow::bail!("{:?} is off the board", pos),
    })
  }
}

proptest! {
  // 1. Certain mines are new, real, and reported only once
  #[test]
  fn certain_mines_are_new_and_real(scenario in scenario_strategy()) {
    let game = scenario.game();
    let mut board = scenario.board(&game);
    let before = board.mines_found().clone();

    let mines = find_certain_mines(&mut board);
    for pos in &mines {
      prop_assert!(!before.contains(pos));
      prop_assert_eq!(game.field(*pos), Some(Field::Mine));
    }
    prop_assert!(find_certain_mines(&mut board).is_empty());
  }

  // 2. Safe moves are unopened, unflagged and really safe
  #[test]
  fn safe_moves_are_unopened_and_safe(scenario in scenario_strategy()) {
    let game = scenario.game();
    let mut board = scenario.board(&game);
    find_certain_mines(&mut board);

    for pos in find_safe_moves(&board) {
      let cell = board.cell(pos).unwrap();
      prop_assert!(cell.value.is_none());
      prop_assert!(!cell.is_flagged);
      prop_assert!(!game.field(pos).unwrap().is_mine());
    }
  }

  // 3. The estimate always offers a guess while unopened cells remain
  #[test]
  fn estimate_offers_a_guess(scenario in scenario_strategy()) {
    let game = scenario.game();
    let mut board = scenario.board(&game);
    find_certain_mines(&mut board);
    let unresolved = board.unresolved().count();

    let candidates = estimate_probabilities(&mut board, &SolverConfig::default());
    prop_assert_eq!(candidates.is_empty(), unresolved == 0);
    for pos in &candidates {
      let probability = board.cell(*pos).unwrap().probability;
      prop_assert!((0.0..=1.0).contains(&probability));
      prop_assert!(board.cell(*pos).unwrap().is_unopened());
    }
  }

  // 4. Flood fill reads each cell at most once and never a known one
  #[test]
  fn flood_fill_reads_each_cell_once(scenario in scenario_strategy()) {
    let game = scenario.game();
    let mut board = scenario.board(&game);
    let zero = board
      .cells()
      .find(|(_, cell)| cell.value == Some(CellValue::Count(0)))
      .map(|(pos, _)| pos);
    if let Some(origin) = zero {
      let known: Vec<Pos> = board.cells().filter(|(_, cell)| cell.value.is_some()).map(|(pos, _)| pos).collect();
      let mut source = CountingGame { game: game.clone(), requests: HashMap::new() };

      flood_fill(&mut board, origin, &mut source).unwrap();

      prop_assert!(source.requests.values().all(|&count| count == 1));
      for pos in known {
        prop_assert!(!source.requests.contains_key(&pos));
      }
      prop_assert!(source.requests.keys().all(|pos| board.contains(*pos)));
    }
  }
}
