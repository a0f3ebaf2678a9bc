use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tuning for the solve loop and the probability estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
  /// Turns before the solver gives up on a stuck board.
  pub max_iterations: usize,
  /// Share of the local estimate when blending with the global mine density.
  pub local_weight: f64,
  /// Weight of a constraint that neither forces all nor none of its cells.
  pub uncertain_weight: f64,
  /// Lowest probability a cell next to a saturated constraint is given.
  pub safe_floor: f64,
  /// Total number of mines on the board, when the game tells us.
  pub total_mines: Option<u32>,
  /// Avoid guessing cells touched by at least this many open constraints.
  pub overlap_threshold: Option<usize>,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      max_iterations: 100,
      local_weight: 0.9,
      uncertain_weight: 0.5,
      safe_floor: 0.1,
      total_mines: None,
      overlap_threshold: None,
    }
  }
}

impl SolverConfig {
  /// Missing keys fall back to the defaults, unknown keys are ignored.
  pub fn from_json(json: &str) -> serde_json::Result<Self> {
    serde_json::from_str(json)
  }

  /// Defaults, overridden by `MINESWEEPER_MAX_ITERATIONS`, `MINESWEEPER_TOTAL_MINES` and
  /// `MINESWEEPER_OVERLAP_THRESHOLD`.
  pub fn from_env() -> Self {
    let mut config = Self::default();
    if let Some(max_iterations) = env_var("MINESWEEPER_MAX_ITERATIONS") {
      config.max_iterations = max_iterations;
    }
    if let Some(total_mines) = env_var("MINESWEEPER_TOTAL_MINES") {
      config.total_mines = Some(total_mines);
    }
    if let Some(threshold) = env_var("MINESWEEPER_OVERLAP_THRESHOLD") {
      config.overlap_threshold = Some(threshold);
    }
    config
  }
}

fn env_var<T: FromStr>(key: &str) -> Option<T> {
  let raw = env::var(key).ok()?;
  match raw.trim().parse() {
    Ok(value) => Some(value),
    Err(_) => {
      log::warn!("ignoring {}={:?}, not a valid number", key, raw);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_fills_in_defaults() {
    let config = SolverConfig::from_json(r#"{"max_iterations": 7, "total_mines": 10, "debug_mode": true}"#).unwrap();
    assert_eq!(config.max_iterations, 7);
    assert_eq!(config.total_mines, Some(10));
    assert_eq!(config.local_weight, 0.9);
    assert_eq!(config.overlap_threshold, None);
  }

  #[test]
  fn json_round_trips() {
    let config = SolverConfig {
      overlap_threshold: Some(3),
      ..SolverConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SolverConfig::from_json(&json).unwrap(), config);
  }

  #[test]
  fn malformed_json_is_an_error() {
    assert!(SolverConfig::from_json(r#"{"max_iterations": "many"}"#).is_err());
  }

  #[test]
  fn environment_overrides_defaults() {
    env::set_var("MINESWEEPER_MAX_ITERATIONS", "12");
    env::set_var("MINESWEEPER_TOTAL_MINES", "not a number");
    let config = SolverConfig::from_env();
    env::remove_var("MINESWEEPER_MAX_ITERATIONS");
    env::remove_var("MINESWEEPER_TOTAL_MINES");
    assert_eq!(config.max_iterations, 12);
    assert_eq!(config.total_mines, None);
  }
}
