//! An in-memory game that stands in for the screen. Used by the command line game and by tests.

use core::fmt;
use std::borrow::Borrow;
use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::error::PerceptionError;
use crate::grid::{Grid, GridExplorer, Pos};
use crate::io::{MoveSink, TileReading, TileSource};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Field {
  Mine,
  Empty(u8),
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
      Field::Mine => write!(f, "*"),
      Field::Empty(0) => write!(f, " "),
      Field::Empty(mines) => write!(f, "{}", mines),
    }
  }
}

pub struct GameSetupBuilder {
  mines: Grid<bool>,
  protected: Grid<bool>,
  rng: Box<dyn RngCore>,
}

impl GameSetupBuilder {
  pub fn new(rows: u32, cols: u32) -> Self {
    Self {
      mines: Grid::new(rows, cols, false),
      protected: Grid::new(rows, cols, false),
      rng: Box::new(rand::thread_rng()),
    }
  }

  /// Makes mine placement reproducible.
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.rng = Box::new(StdRng::seed_from_u64(seed));
    self
  }

  pub fn has_mine(&self, pos: Pos) -> bool {
    self.mines.get(pos).copied().unwrap_or(false)
  }

  pub fn set_mine(&mut self, pos: Pos) {
    if !self.is_protected(pos) {
      if let Some(field) = self.mines.get_mut(pos) {
        *field = true;
      }
    }
  }

  pub fn is_protected(&self, pos: Pos) -> bool {
    self.protected.get(pos).copied().unwrap_or(false)
  }

  pub fn protect(&mut self, pos: Pos) {
    if let (Some(mine), Some(protected)) = (self.mines.get_mut(pos), self.protected.get_mut(pos)) {
      *mine = false;
      *protected = true;
    }
  }

  pub fn protect_all(&mut self, all: impl IntoIterator<Item = Pos>) {
    for pos in all {
      self.protect(pos);
    }
  }

  /// Scatters `mines` more mines over unprotected cells. False if they did not fit.
  pub fn add_random_mines(&mut self, mut mines: u32) -> bool {
    let mut possible_positions: Vec<_> = self.mines.positions().collect();
    possible_positions.shuffle(&mut self.rng);

    while let Some(pos) = possible_positions.pop() {
      if mines == 0 {
        return true;
      }

      if self.is_protected(pos) || self.has_mine(pos) {
        continue;
      }

      self.set_mine(pos);
      mines -= 1;
    }

    mines == 0
  }
}

/// Hidden mine layout plus what the player can currently see.
#[derive(Clone, PartialEq, Eq)]
pub struct SimulatedGame {
  fields: Grid<Field>,
  visible: Grid<bool>,
  flagged: Grid<bool>,
  mines: u32,
  exploded: Option<Pos>,
  observations: usize,
  fail_every: Option<usize>,
}

impl SimulatedGame {
  pub fn new(mines: &Grid<bool>) -> Self {
    let mut fields = Grid::new(mines.rows(), mines.cols(), Field::Empty(0));
    let mut count = 0;
    for (pos, &is_mine) in mines.enumerate() {
      if is_mine {
        count += 1;
        fields[pos] = Field::Mine;
        let around: Vec<_> = fields.neighbours(pos).collect();
        for neighbour_pos in around {
          Field::notify_mine(&mut fields[neighbour_pos]);
        }
      }
    }

    Self {
      visible: Grid::new(mines.rows(), mines.cols(), false),
      flagged: Grid::new(mines.rows(), mines.cols(), false),
      fields,
      mines: count,
      exploded: None,
      observations: 0,
      fail_every: None,
    }
  }

  /// Every `n`-th observation fails as if the tile could not be read.
  pub fn flaky(mut self, n: usize) -> Self {
    self.fail_every = Some(n.max(1));
    self
  }

  pub fn rows(&self) -> u32 {
    self.fields.rows()
  }

  pub fn cols(&self) -> u32 {
    self.fields.cols()
  }

  pub fn mines(&self) -> u32 {
    self.mines
  }

  pub fn field(&self, pos: Pos) -> Option<Field> {
    self.fields.get(pos).copied()
  }

  pub fn is_flagged(&self, pos: Pos) -> bool {
    self.flagged.get(pos).copied().unwrap_or(false)
  }

  pub fn exploded(&self) -> Option<Pos> {
    self.exploded
  }

  /// All safe cells are visible.
  pub fn is_win(&self) -> bool {
    self.exploded.is_none()
      && self
        .fields
        .enumerate()
        .all(|(pos, field)| field.is_mine() || self.visible[pos])
  }

  /// Opens `pos` the way a real game does, spreading through blank cells. Returns the cells that
  /// became visible, or `None` if `pos` is a mine.
  pub fn open(&mut self, pos: Pos) -> Option<Vec<Pos>> {
    let field = self.field(pos)?;
    if field.is_mine() {
      self.visible[pos] = true;
      self.exploded = Some(pos);
      return None;
    }

    let mut opened = Vec::new();
    let mut explorer = GridExplorer::from(&self.fields);
    explorer.enqueue(pos);
    while let Some(pos) = explorer.pop() {
      if !self.visible[pos] {
        self.visible[pos] = true;
        opened.push(pos);
      }
      if self.fields[pos].is_blank() {
        explorer.enqueue_all(self.fields.neighbours(pos));
      }
    }
    Some(opened)
  }

  /// Shares the game between a tile source and a move sink.
  pub fn shared(self) -> SharedGame {
    SharedGame(Rc::new(RefCell::new(self)))
  }
}

impl<B: Borrow<GameSetupBuilder>> From<B> for SimulatedGame {
  fn from(builder: B) -> Self {
    Self::new(&builder.borrow().mines)
  }
}

impl fmt::Debug for SimulatedGame {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for pos in self.fields.positions() {
      if self.flagged[pos] && !self.visible[pos] {
        write!(f, "F")?;
      } else if self.visible[pos] {
        write!(f, "{}", self.fields[pos])?;
      } else {
        write!(f, "#")?;
      }
      if pos.col + 1 == self.cols() as i32 {
        writeln!(f)?;
      }
    }

    Ok(())
  }
}

impl TileSource for SimulatedGame {
  fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading> {
    self.observations += 1;
    if let Some(n) = self.fail_every {
      if self.observations % n == 0 {
        return Err(PerceptionError::UnreadableTile(pos).into());
      }
    }

    let field = self.field(pos).ok_or(PerceptionError::UnreadableTile(pos))?;
    if !self.visible[pos] {
      return Ok(TileReading::Unopened);
    }
    Ok(match field {
      Field::Mine => TileReading::Mine,
      Field::Empty(count) => TileReading::Number(count),
    })
  }
}

impl MoveSink for SimulatedGame {
  fn reveal(&mut self, pos: Pos) -> anyhow::Result<()> {
    if self.exploded.is_some() {
      anyhow::bail!("game is already lost");
    }
    self.open(pos);
    Ok(())
  }

  fn flag(&mut self, pos: Pos) -> anyhow::Result<()> {
    let flagged = self
      .flagged
      .get_mut(pos)
      .ok_or_else(|| PerceptionError::Io(format!("no tile at {:?}", pos)))?;
    *flagged = true;
    Ok(())
  }
}

/// Cloneable handle to one [`SimulatedGame`].
#[derive(Clone)]
pub struct SharedGame(Rc<RefCell<SimulatedGame>>);

impl SharedGame {
  pub fn with<R>(&self, f: impl FnOnce(&SimulatedGame) -> R) -> R {
    f(&RefCell::borrow(&self.0))
  }
}

impl TileSource for SharedGame {
  fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading> {
    self.0.borrow_mut().observe(pos)
  }
}

impl MoveSink for SharedGame {
  fn reveal(&mut self, pos: Pos) -> anyhow::Result<()> {
    self.0.borrow_mut().reveal(pos)
  }

  fn flag(&mut self, pos: Pos) -> anyhow::Result<()> {
    self.0.borrow_mut().flag(pos)
  }
}
