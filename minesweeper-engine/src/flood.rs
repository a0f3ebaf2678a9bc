use crate::board::{Board, CellValue};
use crate::error::BoardError;
use crate::grid::{GridExplorer, Pos};
use crate::io::{read_tile, TileSource};

/// What a single flood fill learned.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct FloodFill {
  /// Newly known cells in the order they were read.
  pub revealed: Vec<(Pos, CellValue)>,
  /// Number of observation requests issued.
  pub observed: usize,
}

/// Reads the connected zero region around `origin` and its numbered border into `board`.
///
/// Does nothing unless `origin` is a known zero. Each cell is observed at most once, cells with a
/// known value are never observed, and a cell that does not read as opened is dropped without
/// exploring past it.
pub fn flood_fill(board: &mut Board, origin: Pos, source: &mut impl TileSource) -> Result<FloodFill, BoardError> {
  let mut result = FloodFill::default();
  if board.cell(origin).and_then(|cell| cell.value) != Some(CellValue::Count(0)) {
    log::debug!("{:?} is not a known zero, nothing to flood", origin);
    return Ok(result);
  }

  let mut explorer = GridExplorer::new(board.rows(), board.cols());
  explorer.visit(origin);
  explorer.enqueue_all(board.neighbours(origin).map(|(pos, _)| pos));

  while let Some(pos) = explorer.pop() {
    if board.cell(pos).map_or(true, |cell| cell.value.is_some()) {
      continue;
    }

    result.observed += 1;
    let value = match read_tile(source, pos).value() {
      Some(value) => value,
      None => {
        log::debug!("{:?} is not visibly open yet, skipping", pos);
        continue;
      }
    };

    if value == CellValue::Mine {
      log::warn!("{:?} borders a zero region but reads as a mine", pos);
    }
    board.update_cell(pos, value)?;
    result.revealed.push((pos, value));

    if value == CellValue::Count(0) {
      let next: Vec<_> = board
        .neighbours(pos)
        .filter(|(neighbour_pos, _)| !explorer.is_visited(*neighbour_pos))
        .map(|(neighbour_pos, _)| neighbour_pos)
        .collect();
      explorer.enqueue_all(next);
    }
  }

  log::debug!(
    "flood from {:?} revealed {} cells with {} observations",
    origin,
    result.revealed.len(),
    result.observed
  );
  Ok(result)
}
