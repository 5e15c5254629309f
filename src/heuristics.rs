//! Remaining-cost estimates for informed search.
//!
//! Every heuristic is a pure `fn(&Board) -> u32` and is selected by name
//! through [`HeuristicKind`]. Only `Zero` and `DistanceToExit` are treated as
//! admissible. The blocking-based estimates are kept for comparison and A*
//! makes no optimality promise when they are selected.
use crate::engine::Board;
use crate::error::SolveError;
use std::fmt;
use std::str::FromStr;

/// Signature shared by every heuristic.
pub type HeuristicFn = fn(&Board) -> u32;

/// Always 0. Admissible; turns A* into a uniform-cost (BFS-equivalent) search.
pub fn zero(_board: &Board) -> u32 {
    0
}

/// Number of cells the goal vehicle still has to travel to reach the exit.
///
/// Admissible: every move advances the goal by at most one cell, even on an
/// otherwise empty board. It is also consistent, since a single move changes
/// it by at most one.
///
/// # Arguments
/// * `board`: The configuration to estimate.
///
/// # Returns
/// The exit coordinate minus the goal's leading coordinate; 0 once solved.
///
/// # Examples
/// ```
/// use rush_hour_solver::heuristics::distance_to_exit;
/// use rush_hour_solver::utils::board_from_str_array;
/// let board = board_from_str_array(&["XX...."]).unwrap();
/// assert_eq!(distance_to_exit(&board), 4);
/// ```
pub fn distance_to_exit(board: &Board) -> u32 {
    let goal = board.goal();
    let lead = goal.orientation().coordinate(goal.end());
    (board.exit_coordinate() - lead) as u32
}

/// Number of distinct vehicles between the goal vehicle and the exit.
///
/// Not treated as admissible: A* keeps its closed-set policy with it and the
/// shortest-path guarantee is forfeited.
///
/// # Arguments
/// * `board`: The configuration to estimate.
///
/// # Returns
/// How many different vehicles, movable or fixed, cover at least one cell of
/// the goal's lane ahead of it.
///
/// # Examples
/// ```
/// use rush_hour_solver::heuristics::blocking_count;
/// use rush_hour_solver::utils::board_from_str_array;
/// // `A` covers two lane cells but counts once.
/// let board = board_from_str_array(&["XXAA.b"]).unwrap();
/// assert_eq!(blocking_count(&board), 2);
/// ```
pub fn blocking_count(board: &Board) -> u32 {
    // Lanes are at most a board wide, so a linear `contains` is enough.
    let mut blockers: Vec<char> = Vec::new();
    for cell in board.cells_toward_exit() {
        if let Some(vehicle) = board.occupant(cell) {
            if !blockers.contains(&vehicle.id()) {
                blockers.push(vehicle.id());
            }
        }
    }
    blockers.len() as u32
}

/// `distance_to_exit + blocking_count`. Inherits the blocking count's inadmissibility.
pub fn distance_plus_blocking(board: &Board) -> u32 {
    distance_to_exit(board) + blocking_count(board)
}

/// The fixed registry of heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeuristicKind {
    Zero,
    DistanceToExit,
    BlockingCount,
    DistancePlusBlocking,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 4] = [
        HeuristicKind::Zero,
        HeuristicKind::DistanceToExit,
        HeuristicKind::BlockingCount,
        HeuristicKind::DistancePlusBlocking,
    ];

    /// Canonical registry name.
    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::Zero => "zero",
            HeuristicKind::DistanceToExit => "distance",
            HeuristicKind::BlockingCount => "blocking",
            HeuristicKind::DistancePlusBlocking => "distance-plus-blocking",
        }
    }

    /// Alternative names accepted by `from_str`, kept for board-runner scripts
    /// written against the older camelCase names.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            HeuristicKind::Zero => &["null", "null_heuristic"],
            HeuristicKind::DistanceToExit => &["distance-to-exit", "distance_from_the_exit_Heuristic"],
            HeuristicKind::BlockingCount => &["blocking-count", "blockingHeuristic"],
            HeuristicKind::DistancePlusBlocking => &["distancePlusBlockingHeuristic"],
        }
    }

    /// The estimate function behind this entry.
    ///
    /// # Returns
    /// A plain function pointer, so the search can call it without matching
    /// on the registry for every node.
    pub fn function(self) -> HeuristicFn {
        match self {
            HeuristicKind::Zero => zero,
            HeuristicKind::DistanceToExit => distance_to_exit,
            HeuristicKind::BlockingCount => blocking_count,
            HeuristicKind::DistancePlusBlocking => distance_plus_blocking,
        }
    }

    /// Evaluates this heuristic on `board`.
    ///
    /// # Arguments
    /// * `board`: The configuration to estimate.
    ///
    /// # Returns
    /// The estimated number of moves still needed.
    pub fn estimate(self, board: &Board) -> u32 {
        (self.function())(board)
    }

    /// Whether A* is guaranteed to return a shortest solution with this heuristic.
    pub fn is_admissible(self) -> bool {
        match self {
            HeuristicKind::Zero | HeuristicKind::DistanceToExit => true,
            HeuristicKind::BlockingCount | HeuristicKind::DistancePlusBlocking => false,
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = SolveError;

    /// Resolves a registry name. Unknown names are an error, never a default.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        HeuristicKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.aliases().contains(&name))
            .ok_or_else(|| SolveError::UnknownHeuristic(name.to_string()))
    }
}
