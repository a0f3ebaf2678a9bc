use std::env;

use minesweeper_engine::grid::Pos;
use minesweeper_engine::sim::{GameSetupBuilder, SimulatedGame};
use minesweeper_engine::{SolveOutcome, Solver, SolverConfig};

const ROWS: u32 = 16;
const COLS: u32 = 30;
const MINES: u32 = 99;

fn make_game(seed: Option<u64>) -> SimulatedGame {
  let start = Pos::new(ROWS as i32 / 2, COLS as i32 / 2);
  let mut builder = GameSetupBuilder::new(ROWS, COLS);
  if let Some(seed) = seed {
    builder = builder.with_seed(seed);
  }
  builder.protect(start);
  builder.protect_all(start.neighbours());
  builder.add_random_mines(MINES);

  let mut game = SimulatedGame::from(builder);
  game.open(start);
  game
}

fn main() {
  env_logger::init();

  let seed = env::args().nth(1).and_then(|arg| arg.parse().ok());
  let mut config = SolverConfig::from_env();
  if config.total_mines.is_none() {
    config.total_mines = Some(MINES);
  }

  let game = make_game(seed).shared();
  let mut solver = Solver::new(ROWS, COLS, game.clone(), game.clone(), config);
  if let Err(err) = solver.observe_all() {
    log::error!("could not read the starting board: {}", err);
    return;
  }

  let report = match solver.solve() {
    Ok(report) => report,
    Err(err) => {
      log::error!("solver aborted: {}", err);
      return;
    }
  };

  println!("{:?}", solver.board());
  game.with(|game| println!("{:?}", game));
  match report.outcome {
    SolveOutcome::Solved => println!("Win!"),
    SolveOutcome::MineHit(pos) => println!("Boom at {:?}", pos),
    SolveOutcome::BudgetExceeded { iterations } => println!("Gave up after {} turns", iterations),
  }
  println!(
    "{} turns, {} reveal batches, {} guesses, {} flags",
    report.iterations, report.reveals, report.guesses, report.flags
  );
}
