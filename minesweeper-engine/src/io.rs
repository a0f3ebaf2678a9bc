//! The two collaborators the engine talks to: something that reads tiles and something that acts on
//! them. Screen capture, template matching and input simulation live behind these traits.

use serde::{Deserialize, Serialize};

use crate::board::CellValue;
use crate::grid::Pos;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileReading {
  /// Not visibly opened yet, or not readable.
  Unopened,
  Number(u8),
  Mine,
}

impl TileReading {
  /// The board value this reading proves, if any.
  pub fn value(self) -> Option<CellValue> {
    match self {
      TileReading::Unopened => None,
      TileReading::Number(count) => Some(CellValue::Count(count)),
      TileReading::Mine => Some(CellValue::Mine),
    }
  }
}

pub trait TileSource {
  /// Reads the current state of a tile. Must not change the game.
  fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading>;
}

pub trait MoveSink {
  fn reveal(&mut self, pos: Pos) -> anyhow::Result<()>;
  fn flag(&mut self, pos: Pos) -> anyhow::Result<()>;
}

impl<T: TileSource + ?Sized> TileSource for &mut T {
  fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading> {
    (**self).observe(pos)
  }
}

impl<T: MoveSink + ?Sized> MoveSink for &mut T {
  fn reveal(&mut self, pos: Pos) -> anyhow::Result<()> {
    (**self).reveal(pos)
  }

  fn flag(&mut self, pos: Pos) -> anyhow::Result<()> {
    (**self).flag(pos)
  }
}

/// Observes `pos`, folding any failure into [`TileReading::Unopened`].
pub fn read_tile(source: &mut impl TileSource, pos: Pos) -> TileReading {
  match source.observe(pos) {
    Ok(TileReading::Number(count)) if count > 8 => {
      log::warn!("discarding impossible reading {} at {:?}", count, pos);
      TileReading::Unopened
    }
    Ok(reading) => reading,
    Err(err) => {
      log::warn!("observing {:?} failed, treating it as unopened: {:#}", pos, err);
      TileReading::Unopened
    }
  }
}

/// Where the board sits on screen. Handed to a move sink when it is built.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ScreenGeometry {
  pub origin_x: i32,
  pub origin_y: i32,
  pub tile_width: u32,
  pub tile_height: u32,
}

impl ScreenGeometry {
  /// Pixel coordinates of the centre of the tile at `pos`.
  pub fn tile_center(&self, pos: Pos) -> (i32, i32) {
    (
      self.origin_x + pos.col * self.tile_width as i32 + self.tile_width as i32 / 2,
      self.origin_y + pos.row * self.tile_height as i32 + self.tile_height as i32 / 2,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::PerceptionError;

  struct Broken;

  impl TileSource for Broken {
    fn observe(&mut self, pos: Pos) -> anyhow::Result<TileReading> {
      Err(PerceptionError::UnreadableTile(pos).into())
    }
  }

  struct Fixed(TileReading);

  impl TileSource for Fixed {
    fn observe(&mut self, _pos: Pos) -> anyhow::Result<TileReading> {
      Ok(self.0)
    }
  }

  #[test]
  fn failed_observation_reads_as_unopened() {
    assert_eq!(read_tile(&mut Broken, Pos::new(0, 0)), TileReading::Unopened);
  }

  #[test]
  fn impossible_numbers_are_discarded() {
    assert_eq!(read_tile(&mut Fixed(TileReading::Number(9)), Pos::new(0, 0)), TileReading::Unopened);
    assert_eq!(read_tile(&mut Fixed(TileReading::Number(3)), Pos::new(0, 0)), TileReading::Number(3));
  }

  #[test]
  fn readings_map_to_values() {
    assert_eq!(TileReading::Unopened.value(), None);
    assert_eq!(TileReading::Number(0).value(), Some(CellValue::Count(0)));
    assert_eq!(TileReading::Mine.value(), Some(CellValue::Mine));
  }

  #[test]
  fn tile_center_uses_geometry() {
    let geometry = ScreenGeometry {
      origin_x: 100,
      origin_y: 50,
      tile_width: 16,
      tile_height: 20,
    };
    assert_eq!(geometry.tile_center(Pos::new(0, 0)), (108, 60));
    assert_eq!(geometry.tile_center(Pos::new(2, 3)), (156, 100));
  }
}
