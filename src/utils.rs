//! Board loading, random puzzle generation and logging setup.
//!
//! The text format has one line per row, all of equal length:
//! - `.`: an empty cell;
//! - `X`: the goal vehicle;
//! - other uppercase letters: movable vehicles;
//! - lowercase letters: fixed (broken-down) vehicles.
//!
//! A vehicle's start is its first cell in row-major order and its end the last.
use crate::engine::{Board, Cell, Orientation, Vehicle, VehicleClass};
use crate::error::{Result, SolveError};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Height and width of boards produced by [`random_puzzle_with_seed`].
pub const RANDOM_BOARD_SIZE: usize = 6;

struct Placement {
    first_line: usize,
    start: Cell,
    end: Cell,
    cells: usize,
}

fn class_for(letter: char) -> VehicleClass {
    if letter == 'X' {
        VehicleClass::Goal
    } else if letter.is_uppercase() {
        VehicleClass::Movable
    } else {
        VehicleClass::Fixed
    }
}

/// Parses an array of row strings into a validated [`Board`].
///
/// Vehicles are ordered by id. Single-cell vehicles are horizontal.
///
/// # Errors
/// * `Parse` for ragged rows, characters other than ASCII letters and `.`,
///   and letters whose cells are not one contiguous straight run.
/// * Any `Board::new` precondition error, e.g. `MissingGoal` when no `X` is present.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::board_from_str_array;
/// use rush_hour_solver::engine::{Cell, VehicleClass};
///
/// let board = board_from_str_array(&[
///     "A.....",
///     "A.XX..",
///     "...b..",
/// ]).unwrap();
/// assert_eq!(board.height(), 3);
/// assert_eq!(board.width(), 6);
/// assert_eq!(board.goal().start(), Cell::new(1, 2));
/// assert_eq!(board.vehicle('b').unwrap().class(), VehicleClass::Fixed);
///
/// assert!(board_from_str_array(&["XX.", "..?"]).is_err());
/// ```
pub fn board_from_str_array(rows: &[&str]) -> Result<Board> {
    let width = match rows.first() {
        Some(row) => row.chars().count(),
        None => return Err(SolveError::EmptyBoard),
    };

    let mut placements: BTreeMap<char, Placement> = BTreeMap::new();
    for (r, row) in rows.iter().enumerate() {
        let line = r + 1;
        if row.chars().count() != width {
            return Err(SolveError::Parse {
                line,
                message: format!(
                    "expected {} characters like the first row, found {}",
                    width,
                    row.chars().count()
                ),
            });
        }

        for (c, letter) in row.chars().enumerate() {
            if letter == '.' {
                continue;
            }
            if !letter.is_ascii_alphabetic() {
                return Err(SolveError::Parse {
                    line,
                    message: format!("unrecognized character '{}' in column {}", letter, c),
                });
            }
            let cell = Cell::new(r, c);
            placements
                .entry(letter)
                .and_modify(|p| {
                    p.end = cell;
                    p.cells += 1;
                })
                .or_insert(Placement {
                    first_line: line,
                    start: cell,
                    end: cell,
                    cells: 1,
                });
        }
    }

    let mut vehicles = Vec::with_capacity(placements.len());
    for (letter, placement) in placements {
        let vehicle = Vehicle::new(letter, class_for(letter), placement.start, placement.end)?;
        if vehicle.len() != placement.cells {
            return Err(SolveError::Parse {
                line: placement.first_line,
                message: format!("vehicle '{}' is not one contiguous run of cells", letter),
            });
        }
        vehicles.push(vehicle);
    }

    Board::new(rows.len(), width, vehicles)
}

/// Parses a whole board file. Surrounding whitespace and blank lines are ignored.
pub fn board_from_str(text: &str) -> Result<Board> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    board_from_str_array(&rows)
}

/// Applies `steps` uniformly random legal moves to `board`.
///
/// Moves are reversible, so a scramble of a solvable board stays solvable.
pub fn scramble(board: &Board, steps: usize, rng: &mut impl Rng) -> Board {
    let mut current = board.clone();
    for _ in 0..steps {
        let moves = current.legal_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        // `mv` came from `legal_moves`, so it applies cleanly.
        if current.apply(mv).is_err() {
            break;
        }
    }
    current
}

/// Generates a solvable 6x6 puzzle from `seed`.
///
/// The goal vehicle starts solved on row 2, up to `vehicles` other vehicles are
/// dropped on random free spots (roughly one in six of them fixed), and the
/// result is scrambled with `scramble_steps` random moves. The same seed always
/// yields the same board.
pub fn random_puzzle_with_seed(seed: u64, vehicles: usize, scramble_steps: usize) -> Result<Board> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let goal_row = 2;
    let goal = Vehicle::new(
        'X',
        VehicleClass::Goal,
        Cell::new(goal_row, RANDOM_BOARD_SIZE - 2),
        Cell::new(goal_row, RANDOM_BOARD_SIZE - 1),
    )?;
    let mut placed = vec![goal];
    let mut movable_ids = ('A'..='Z').filter(|&c| c != 'X');
    let mut fixed_ids = 'a'..='z';

    for _ in 0..vehicles {
        let fixed = rng.gen_range(0..6) == 0;
        let (id, class, len) = if fixed {
            (fixed_ids.next(), VehicleClass::Fixed, 1)
        } else {
            (movable_ids.next(), VehicleClass::Movable, rng.gen_range(2..=3))
        };
        let Some(id) = id else { break };

        for _ in 0..16 {
            let orientation = if rng.gen_bool(0.5) {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (rows, cols) = match orientation {
                Orientation::Horizontal => (RANDOM_BOARD_SIZE, RANDOM_BOARD_SIZE - len + 1),
                Orientation::Vertical => (RANDOM_BOARD_SIZE - len + 1, RANDOM_BOARD_SIZE),
            };
            let start = Cell::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
            // Horizontal movers on the goal row would wall it in for good.
            if orientation == Orientation::Horizontal && start.row == goal_row && len > 1 {
                continue;
            }
            let candidate = match orientation {
                _ if len == 1 => Vehicle::single(id, class, start, orientation),
                Orientation::Horizontal => {
                    Vehicle::new(id, class, start, Cell::new(start.row, start.col + len - 1))?
                }
                Orientation::Vertical => {
                    Vehicle::new(id, class, start, Cell::new(start.row + len - 1, start.col))?
                }
            };
            if candidate.cells().all(|cell| placed.iter().all(|v| v.cells().all(|c| c != cell))) {
                placed.push(candidate);
                break;
            }
        }
    }

    placed.sort_by_key(Vehicle::id);
    let board = Board::new(RANDOM_BOARD_SIZE, RANDOM_BOARD_SIZE, placed)?;
    Ok(scramble(&board, scramble_steps, &mut rng))
}

/// Targets that log under the `--verbose` switch: the library and both binaries.
const LOG_TARGETS: [&str; 3] = ["rush_hour_solver", "rush_hour", "heuristic_evaluator"];

/// The filter used when `RUST_LOG` is unset.
///
/// # Arguments
/// * `verbose`: Raise the crate's own targets from `info` to `debug`.
///
/// # Returns
/// An `EnvFilter` enabling [`LOG_TARGETS`] at `info` (or `debug`) and every
/// other target at `warn` (or `info`).
pub fn default_filter(verbose: bool) -> EnvFilter {
    let (own, rest) = if verbose { ("debug", "info") } else { ("info", "warn") };
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, own))
        .collect();
    directives.push(rest.to_string());
    EnvFilter::new(directives.join(","))
}

/// Installs the global `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` wins when set; otherwise [`default_filter`] applies.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a global tracing subscriber was already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&[
            "AA...O",
            "P..Q.O",
            "PXXQ.O",
            "P..Q..",
            "B...CC",
            "B.RRR.",
        ])
        .unwrap();
        assert_eq!(board.vehicles().len(), 8);
        let ids: Vec<char> = board.vehicles().iter().map(Vehicle::id).collect();
        assert_eq!(ids, vec!['A', 'B', 'C', 'O', 'P', 'Q', 'R', 'X']);
        assert_eq!(board.goal().id(), 'X');
        assert_eq!(board.goal().orientation(), Orientation::Horizontal);
        assert_eq!(board.vehicle('O').unwrap().orientation(), Orientation::Vertical);
        assert_eq!(board.vehicle('R').unwrap().len(), 3);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["XX.", ".#."]);
        match result {
            Err(SolveError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("unrecognized character '#'"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_board_from_str_array_ragged_rows() {
        let result = board_from_str_array(&["XX....", "...."]);
        assert!(matches!(result, Err(SolveError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_board_from_str_array_missing_goal() {
        assert_eq!(board_from_str_array(&["AA..", "...."]), Err(SolveError::MissingGoal));
        assert_eq!(board_from_str_array(&[]), Err(SolveError::EmptyBoard));
    }

    #[test]
    fn test_board_from_str_array_rejects_scattered_letters() {
        let gap = board_from_str_array(&["XX..", "A..A"]);
        assert!(matches!(gap, Err(SolveError::Parse { line: 2, .. })));

        let bent = board_from_str_array(&["XXA.", "..A.", "...A"]);
        assert!(matches!(bent, Err(SolveError::MisalignedVehicle { vehicle: 'A', .. })));
    }

    #[test]
    fn test_board_from_str_trims_blank_lines() {
        let board = board_from_str("\n  ..A..\n  XXA..\n\n").unwrap();
        assert_eq!(board.height(), 2);
        assert_eq!(board.width(), 5);
    }

    #[test]
    fn test_scramble_is_seeded_and_legal() {
        let solved = board_from_str_array(&[
            "A.....",
            "A..B..",
            "...BXX",
            "......",
        ])
        .unwrap();
        let a = scramble(&solved, 40, &mut SmallRng::seed_from_u64(7));
        let b = scramble(&solved, 40, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.vehicles().len(), solved.vehicles().len());
        for vehicle in a.vehicles() {
            let original = solved.vehicle(vehicle.id()).unwrap();
            assert_eq!(vehicle.len(), original.len());
            assert_eq!(vehicle.orientation(), original.orientation());
        }
    }

    fn enabled_under(verbose: bool, check: fn() -> bool) -> bool {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(default_filter(verbose))
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn test_default_filter_covers_binaries() {
        use tracing::Level;

        // Quiet: info from the crate and both binaries, only warnings from elsewhere.
        assert!(enabled_under(false, || tracing::enabled!(target: "rush_hour", Level::INFO)));
        assert!(enabled_under(false, || tracing::enabled!(target: "heuristic_evaluator", Level::INFO)));
        assert!(enabled_under(false, || tracing::enabled!(target: "rush_hour_solver::solver", Level::INFO)));
        assert!(!enabled_under(false, || tracing::enabled!(target: "rush_hour", Level::DEBUG)));
        assert!(!enabled_under(false, || tracing::enabled!(target: "other_crate", Level::INFO)));

        // Verbose: debug everywhere in our own targets.
        assert!(enabled_under(true, || tracing::enabled!(target: "rush_hour", Level::DEBUG)));
        assert!(enabled_under(true, || tracing::enabled!(target: "heuristic_evaluator", Level::DEBUG)));
        assert!(enabled_under(true, || tracing::enabled!(target: "rush_hour_solver::solver", Level::DEBUG)));
        assert!(!enabled_under(true, || tracing::enabled!(target: "other_crate", Level::DEBUG)));
    }

    #[test]
    fn test_random_puzzle_with_seed_determinism() {
        let first = random_puzzle_with_seed(42, 8, 60).unwrap();
        let second = random_puzzle_with_seed(42, 8, 60).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.height(), RANDOM_BOARD_SIZE);
        assert_eq!(first.width(), RANDOM_BOARD_SIZE);
        assert_eq!(first.goal().len(), 2);
        assert_eq!(first.goal().start().row, 2);
        assert!(first.vehicles().len() > 1);
    }
}
