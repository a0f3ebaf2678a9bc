//! Minesweeper inference engine.
//!
//! Works out which cells are mines, which are safe, and which guess is least risky, from what a
//! [`TileSource`] reports. Acts through a [`MoveSink`]. How tiles are read and clicked is up to the
//! caller.

pub mod board;
pub mod config;
pub mod deduce;
pub mod error;
pub mod estimate;
pub mod flood;
pub mod grid;
pub mod io;
pub mod sim;
pub mod solve;

pub use board::{Board, Cell, CellValue};
pub use config::SolverConfig;
pub use error::{BoardError, PerceptionError, SolveError};
pub use grid::Pos;
pub use io::{MoveSink, ScreenGeometry, TileReading, TileSource};
pub use solve::{SolvePhase, SolveOutcome, SolveReport, Solver};
