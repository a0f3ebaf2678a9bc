use crate::board::{Board, CellValue};
use crate::config::SolverConfig;
use crate::deduce::{find_certain_mines, find_mines_by_count, find_safe_by_count, find_safe_moves, overlap_suspects};
use crate::error::SolveError;
use crate::estimate::estimate_probabilities;
use crate::flood::flood_fill;
use crate::grid::Pos;
use crate::io::{read_tile, MoveSink, TileReading, TileSource};

/// Turn order is `DetectMines`, then `SafeMoves`, then `Guess`, falling through while a phase finds
/// nothing to do.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SolvePhase {
  DetectMines,
  SafeMoves,
  Guess,
  Done,
  Failed,
}

impl SolvePhase {
  pub fn is_terminal(self) -> bool {
    matches!(self, SolvePhase::Done | SolvePhase::Failed)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SolveOutcome {
  /// Every cell is either opened or flagged.
  Solved,
  /// Opening this cell hit a mine.
  MineHit(Pos),
  /// Turn budget ran out. The board is stuck or unreadable, but nothing blew up.
  BudgetExceeded { iterations: usize },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SolveReport {
  pub outcome: SolveOutcome,
  pub iterations: usize,
  /// Reveal batches issued, guesses included.
  pub reveals: usize,
  pub flags: usize,
  pub guesses: usize,
}

/// Drives one game: deduce, act, observe, repeat.
///
/// Owns the board for the whole game. Every turn runs mine detection first, then safe moves, and
/// only guesses when both come back empty.
pub struct Solver<S, M> {
  board: Board,
  source: S,
  sink: M,
  config: SolverConfig,
  phase: SolvePhase,
  mine_hit: Option<Pos>,
  iterations: usize,
  reveals: usize,
  flags: usize,
  guesses: usize,
}

impl<S: TileSource, M: MoveSink> Solver<S, M> {
  pub fn new(rows: u32, cols: u32, source: S, sink: M, config: SolverConfig) -> Self {
    Self::with_board(Board::new(rows, cols), source, sink, config)
  }

  pub fn with_board(board: Board, source: S, sink: M, config: SolverConfig) -> Self {
    Self {
      board,
      source,
      sink,
      config,
      phase: SolvePhase::DetectMines,
      mine_hit: None,
      iterations: 0,
      reveals: 0,
      flags: 0,
      guesses: 0,
    }
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn phase(&self) -> SolvePhase {
    self.phase
  }

  pub fn sink(&self) -> &M {
    &self.sink
  }

  /// Reads every unresolved tile once. Useful when joining a game that is already in progress.
  pub fn observe_all(&mut self) -> Result<usize, SolveError> {
    let unresolved: Vec<_> = self.board.unresolved().collect();
    let mut learned = 0;
    for pos in unresolved {
      if let Some(value) = read_tile(&mut self.source, pos).value() {
        self.board.update_cell(pos, value)?;
        learned += 1;
        if value == CellValue::Mine {
          log::warn!("{:?} already shows a mine", pos);
          self.mine_hit = Some(pos);
          self.phase = SolvePhase::Failed;
        }
      }
    }
    log::info!("initial scan found {} opened cells", learned);
    Ok(learned)
  }

  /// Runs turns until the board is solved, a mine is hit, or the turn budget runs out.
  pub fn solve(&mut self) -> Result<SolveReport, SolveError> {
    while !self.phase.is_terminal() && self.iterations < self.config.max_iterations {
      self.step()?;
    }
    if !self.phase.is_terminal() && self.board.is_resolved() {
      self.phase = SolvePhase::Done;
    }

    let outcome = match (self.phase, self.mine_hit) {
      (SolvePhase::Failed, Some(pos)) => SolveOutcome::MineHit(pos),
      (SolvePhase::Done, _) => SolveOutcome::Solved,
      _ => SolveOutcome::BudgetExceeded {
        iterations: self.iterations,
      },
    };
    log::info!("finished after {} turns: {:?}", self.iterations, outcome);
    Ok(self.report(outcome))
  }

  fn report(&self, outcome: SolveOutcome) -> SolveReport {
    SolveReport {
      outcome,
      iterations: self.iterations,
      reveals: self.reveals,
      flags: self.flags,
      guesses: self.guesses,
    }
  }

  /// Plays a single turn and returns the phase that acted.
  ///
  /// Between turns [`Solver::phase`] is `DetectMines`, `Done` or `Failed`. `SafeMoves` and `Guess`
  /// are only current while their turn runs.
  pub fn step(&mut self) -> Result<SolvePhase, SolveError> {
    if self.phase.is_terminal() {
      return Ok(self.phase);
    }
    if self.board.is_resolved() {
      self.phase = SolvePhase::Done;
      return Ok(self.phase);
    }
    self.iterations += 1;

    let acted = self.take_turn()?;
    self.phase = if self.mine_hit.is_some() {
      SolvePhase::Failed
    } else if acted == SolvePhase::Done || self.board.is_resolved() {
      SolvePhase::Done
    } else {
      SolvePhase::DetectMines
    };
    Ok(acted)
  }

  fn take_turn(&mut self) -> Result<SolvePhase, SolveError> {
    self.phase = SolvePhase::DetectMines;
    let mut mines = find_certain_mines(&mut self.board);
    if let Some(total) = self.config.total_mines.filter(|_| mines.is_empty()) {
      mines = find_mines_by_count(&mut self.board, total);
    }
    if !mines.is_empty() {
      log::info!("turn {}: flagging {} mines", self.iterations, mines.len());
      for &pos in &mines {
        if let Err(err) = self.sink.flag(pos) {
          log::warn!("flagging {:?} failed: {:#}", pos, err);
        }
      }
      self.flags += mines.len();
      return Ok(self.phase);
    }

    self.phase = SolvePhase::SafeMoves;
    let mut safe = find_safe_moves(&self.board);
    if let Some(total) = self.config.total_mines.filter(|_| safe.is_empty()) {
      safe = find_safe_by_count(&self.board, total);
    }
    if !safe.is_empty() {
      log::info!("turn {}: opening {} safe cells", self.iterations, safe.len());
      let batch: Vec<_> = safe.into_iter().collect();
      self.open(&batch)?;
      return Ok(self.phase);
    }

    self.phase = SolvePhase::Guess;
    let mut candidates = estimate_probabilities(&mut self.board, &self.config);
    if let Some(threshold) = self.config.overlap_threshold {
      let suspects = overlap_suspects(&self.board, threshold);
      if candidates.iter().any(|pos| !suspects.contains(pos)) {
        candidates.retain(|pos| !suspects.contains(pos));
      }
    }
    let guess = match candidates.into_iter().next() {
      Some(guess) => guess,
      None => return Ok(SolvePhase::Done),
    };
    log::info!(
      "turn {}: guessing {:?} with mine probability {:.3}",
      self.iterations,
      guess,
      self.board.cell(guess).map_or(0.0, |cell| cell.probability)
    );
    self.guesses += 1;
    self.open(&[guess])?;
    Ok(self.phase)
  }

  /// Reveals the whole batch, then reads back every cell and folds the readings into the board.
  fn open(&mut self, batch: &[Pos]) -> Result<(), SolveError> {
    for &pos in batch {
      if let Err(err) = self.sink.reveal(pos) {
        log::warn!("revealing {:?} failed: {:#}", pos, err);
      }
    }
    self.reveals += 1;

    for &pos in batch {
      if self.board.cell(pos).map_or(true, |cell| cell.value.is_some()) {
        continue;
      }
      match read_tile(&mut self.source, pos) {
        TileReading::Unopened => log::debug!("{:?} still reads as unopened", pos),
        TileReading::Mine => {
          log::warn!("{:?} was a mine", pos);
          self.board.update_cell(pos, CellValue::Mine)?;
          self.mine_hit = Some(pos);
          return Ok(());
        }
        TileReading::Number(count) => {
          self.board.update_cell(pos, CellValue::Count(count))?;
          if count == 0 {
            flood_fill(&mut self.board, pos, &mut self.source)?;
          }
        }
      }
    }
    Ok(())
  }
}
