//! # Rush Hour Solver Library
//!
//! Core model and search for sliding-vehicle puzzles: a goal vehicle has to be
//! slid to the exit edge of a rectangular board, moving other vehicles out of
//! its way one cell at a time.
//!
//! It is used by two binaries:
//! - `rush_hour`: Loads a board file, solves it and prints the moves, the
//!   search statistics and optionally every intermediate grid.
//! - `heuristic_evaluator`: Compares A* heuristics against breadth-first search
//!   on seeded random puzzles.
//!
//! ## Modules
//! - `engine`: Vehicles, boards, move generation, the goal test, fingerprints and grids.
//! - `heuristics`: Remaining-cost estimates and the name registry that selects them.
//! - `solver`: Breadth-first and A* search, search limits, statistics and replay.
//! - `utils`: Board parsing, random puzzle generation and logging setup.
//! - `error`: The `SolveError` type shared by all of the above.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;

pub use error::{Result, SolveError};
