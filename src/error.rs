//! Error taxonomy shared by the loader, the data model and the search engine.
//!
//! Reaching no solution is *not* an error; see [`crate::solver::SearchResult`].

use crate::engine::{Cell, Direction};
use thiserror::Error;

/// Errors raised while building boards, configuring the solver, or replaying moves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("board has no rows or columns")]
    EmptyBoard,

    #[error("board has no goal vehicle")]
    MissingGoal,

    #[error("board has more than one goal vehicle ('{first}' and '{second}')")]
    MultipleGoals { first: char, second: char },

    #[error("vehicle '{0}' appears more than once")]
    DuplicateVehicle(char),

    #[error("vehicle '{vehicle}' has misaligned cells {start} and {end}")]
    MisalignedVehicle { vehicle: char, start: Cell, end: Cell },

    #[error("vehicle '{vehicle}' occupies {cell}, outside the {height}x{width} board")]
    OutOfBounds {
        vehicle: char,
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("vehicles '{first}' and '{second}' overlap at {cell}")]
    OverlappingVehicles {
        first: char,
        second: char,
        cell: Cell,
    },

    #[error("unknown heuristic '{0}'")]
    UnknownHeuristic(String),

    #[error("unknown search algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("vehicle '{vehicle}' cannot move {direction}")]
    IllegalMove { vehicle: char, direction: Direction },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SolveError>;
