//! Core puzzle model for Rush Hour style sliding-vehicle boards.
//!
//! This module defines the game's fundamental components:
//! - `Cell`, `Orientation`, `Direction`: grid coordinates and movement axes.
//! - `VehicleClass` and `Vehicle`: the pieces on the board and what they may do.
//! - `Board`: a complete, validated configuration. Every `Board` is a search
//!   state; cloning one yields an independent snapshot.
//! - `Move` and `Fingerprint`: the edges of the state graph and the value-based
//!   key used to recognise states that were already seen.
//! - `Grid`: a rendered occupancy snapshot used for replay and display.
use crate::error::{Result, SolveError};
use std::collections::HashSet;
use std::fmt;

/// A zero-based `(row, col)` position, row 0 at the top of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The axis a vehicle slides along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Occupies one row and slides left/right.
    Horizontal,
    /// Occupies one column and slides up/down.
    Vertical,
}

impl Orientation {
    /// Returns the coordinate of `cell` along this axis.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Cell, Orientation};
    /// assert_eq!(Orientation::Horizontal.coordinate(Cell::new(2, 5)), 5);
    /// assert_eq!(Orientation::Vertical.coordinate(Cell::new(2, 5)), 2);
    /// ```
    pub fn coordinate(self, cell: Cell) -> usize {
        match self {
            Orientation::Horizontal => cell.col,
            Orientation::Vertical => cell.row,
        }
    }

    /// Returns `cell` moved by `offset` along this axis, or `None` on underflow.
    fn offset(self, cell: Cell, offset: isize) -> Option<Cell> {
        match self {
            Orientation::Horizontal => cell
                .col
                .checked_add_signed(offset)
                .map(|col| Cell::new(cell.row, col)),
            Orientation::Vertical => cell
                .row
                .checked_add_signed(offset)
                .map(|row| Cell::new(row, cell.col)),
        }
    }
}

/// A one-cell step along a vehicle's own axis.
///
/// `Forward` increases the coordinate (right for horizontal vehicles, down for
/// vertical ones); `Backward` decreases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Both directions, in the order the move generator tries them.
    pub const ALL: [Direction; 2] = [Direction::Forward, Direction::Backward];

    /// The direction that undoes this one.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// The on-screen name of this direction for a vehicle sliding along `orientation`.
    ///
    /// # Arguments
    /// * `orientation`: The axis of the vehicle being moved.
    ///
    /// # Returns
    /// `"Right"`/`"Left"` for horizontal vehicles and `"Down"`/`"Up"` for vertical ones.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Direction, Orientation};
    /// assert_eq!(Direction::Forward.screen_name(Orientation::Vertical), "Down");
    /// assert_eq!(Direction::Backward.screen_name(Orientation::Horizontal), "Left");
    /// ```
    pub fn screen_name(self, orientation: Orientation) -> &'static str {
        match (orientation, self) {
            (Orientation::Horizontal, Direction::Forward) => "Right",
            (Orientation::Horizontal, Direction::Backward) => "Left",
            (Orientation::Vertical, Direction::Forward) => "Down",
            (Orientation::Vertical, Direction::Backward) => "Up",
        }
    }

    fn delta(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        })
    }
}

/// What role a vehicle plays in the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    /// The vehicle that has to reach the exit. Exactly one per board.
    Goal,
    /// An ordinary vehicle that may be moved out of the way.
    Movable,
    /// A broken-down vehicle; it occupies cells but never moves.
    Fixed,
}

impl VehicleClass {
    /// Whether vehicles of this class may ever be the subject of a move.
    pub fn can_move(self) -> bool {
        match self {
            VehicleClass::Goal | VehicleClass::Movable => true,
            VehicleClass::Fixed => false,
        }
    }
}

/// A straight run of cells between `start` (trailing end) and `end` (leading end).
///
/// Vehicles are plain values. Moving one produces a shifted copy; a vehicle is
/// never resized or reoriented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    id: char,
    class: VehicleClass,
    orientation: Orientation,
    start: Cell,
    end: Cell,
}

impl Vehicle {
    /// Creates a vehicle spanning `start..=end`, deriving its orientation.
    ///
    /// `start` and `end` must lie on the same row (horizontal) or the same
    /// column (vertical), with `start` before `end`. A vehicle whose start and
    /// end coincide is a single cell and is treated as horizontal; use
    /// [`Vehicle::single`] to choose its axis explicitly.
    ///
    /// # Errors
    /// `SolveError::MisalignedVehicle` when the two cells share no axis or are
    /// given in reverse order.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Cell, Orientation, Vehicle, VehicleClass};
    /// let car = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 4), Cell::new(1, 4)).unwrap();
    /// assert_eq!(car.orientation(), Orientation::Vertical);
    /// assert_eq!(car.len(), 2);
    /// ```
    pub fn new(id: char, class: VehicleClass, start: Cell, end: Cell) -> Result<Self> {
        let orientation = if start.row == end.row && start.col <= end.col {
            Orientation::Horizontal
        } else if start.col == end.col && start.row < end.row {
            Orientation::Vertical
        } else {
            return Err(SolveError::MisalignedVehicle {
                vehicle: id,
                start,
                end,
            });
        };
        Ok(Vehicle {
            id,
            class,
            orientation,
            start,
            end,
        })
    }

    /// Creates a one-cell vehicle sliding along `orientation`.
    pub fn single(id: char, class: VehicleClass, cell: Cell, orientation: Orientation) -> Self {
        Vehicle {
            id,
            class,
            orientation,
            start: cell,
            end: cell,
        }
    }

    pub fn id(&self) -> char {
        self.id
    }

    pub fn class(&self) -> VehicleClass {
        self.class
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_goal(&self) -> bool {
        self.class == VehicleClass::Goal
    }

    /// The trailing end, i.e. the cell with the smallest coordinate.
    pub fn start(&self) -> Cell {
        self.start
    }

    /// The leading end, i.e. the cell closest to the forward edge.
    pub fn end(&self) -> Cell {
        self.end
    }

    /// Number of cells the vehicle occupies (always at least 1).
    pub fn len(&self) -> usize {
        self.orientation.coordinate(self.end) - self.orientation.coordinate(self.start) + 1
    }

    /// Occupied cells from start to end.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let (start, orientation) = (self.start, self.orientation);
        (0..self.len()).filter_map(move |i| orientation.offset(start, i as isize))
    }

    /// The cell a one-step move in `direction` would enter, or `None` when that
    /// cell would have a negative coordinate.
    ///
    /// No bounds check against a board is made here; `Board` does that.
    pub fn entering_cell(&self, direction: Direction) -> Option<Cell> {
        let edge = match direction {
            Direction::Forward => self.end,
            Direction::Backward => self.start,
        };
        self.orientation.offset(edge, direction.delta())
    }

    /// The cell a one-step move in `direction` leaves empty.
    pub fn vacated_cell(&self, direction: Direction) -> Cell {
        match direction {
            Direction::Forward => self.start,
            Direction::Backward => self.end,
        }
    }

    /// This vehicle moved one cell in `direction`, without any board checks.
    pub fn shifted(&self, direction: Direction) -> Option<Vehicle> {
        let start = self.orientation.offset(self.start, direction.delta())?;
        let end = self.orientation.offset(self.end, direction.delta())?;
        Some(Vehicle { start, end, ..*self })
    }
}

/// A single-step move: which vehicle slides, and which way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub vehicle: char,
    pub direction: Direction,
}

impl Move {
    pub fn new(vehicle: char, direction: Direction) -> Self {
        Move { vehicle, direction }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vehicle, self.direction)
    }
}

/// Value-based identity of a board configuration.
///
/// Holds every vehicle's start cell, packed as `row * width + col`, in the
/// board's vehicle order. Two boards built from the same puzzle have equal
/// fingerprints iff every vehicle occupies the same cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Box<[usize]>);

/// A complete, validated puzzle configuration.
///
/// The board owns its vehicles and an occupancy index (cell → vehicle). It is
/// both the loaded puzzle and every state the search visits: successors are
/// fresh clones, so sibling branches never observe each other's moves.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    height: usize,
    width: usize,
    vehicles: Vec<Vehicle>,
    occupancy: Vec<Option<usize>>,
    goal: usize,
}

impl Board {
    /// Builds a board, checking every loading precondition.
    ///
    /// # Arguments
    /// * `height`, `width`: grid dimensions, both non-zero.
    /// * `vehicles`: placements in the order used for fingerprints and move
    ///   enumeration.
    ///
    /// # Returns
    /// A `Board` whose occupancy index agrees with `vehicles`.
    ///
    /// # Errors
    /// * `EmptyBoard` if either dimension is zero.
    /// * `DuplicateVehicle` if two vehicles share an id.
    /// * `MissingGoal` / `MultipleGoals` unless exactly one vehicle is `Goal`.
    /// * `OutOfBounds` if a vehicle leaves the grid.
    /// * `OverlappingVehicles` if two vehicles claim the same cell.
    pub fn new(height: usize, width: usize, vehicles: Vec<Vehicle>) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(SolveError::EmptyBoard);
        }

        let mut ids = HashSet::new();
        let mut goal: Option<usize> = None;
        for (index, vehicle) in vehicles.iter().enumerate() {
            if !ids.insert(vehicle.id) {
                return Err(SolveError::DuplicateVehicle(vehicle.id));
            }
            if vehicle.is_goal() {
                if let Some(first) = goal {
                    return Err(SolveError::MultipleGoals {
                        first: vehicles[first].id,
                        second: vehicle.id,
                    });
                }
                goal = Some(index);
            }
        }
        let goal = goal.ok_or(SolveError::MissingGoal)?;

        // Each slot holds the index into `vehicles` of the vehicle covering it.
        let mut occupancy: Vec<Option<usize>> = vec![None; height * width];
        for (index, vehicle) in vehicles.iter().enumerate() {
            for cell in vehicle.cells() {
                if cell.row >= height || cell.col >= width {
                    return Err(SolveError::OutOfBounds {
                        vehicle: vehicle.id,
                        cell,
                        height,
                        width,
                    });
                }
                let slot = &mut occupancy[cell.row * width + cell.col];
                if let Some(other) = *slot {
                    return Err(SolveError::OverlappingVehicles {
                        first: vehicles[other].id,
                        second: vehicle.id,
                        cell,
                    });
                }
                *slot = Some(index);
            }
        }

        Ok(Board {
            height,
            width,
            vehicles,
            occupancy,
            goal,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// All vehicles, in the order given to [`Board::new`].
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Looks a vehicle up by id.
    ///
    /// # Arguments
    /// * `id`: The vehicle's letter.
    ///
    /// # Returns
    /// The vehicle in its current position, or `None` if no vehicle has that id.
    pub fn vehicle(&self, id: char) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// The goal vehicle.
    pub fn goal(&self) -> &Vehicle {
        &self.vehicles[self.goal]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    // Row-major index into `occupancy`. Callers check bounds first.
    fn slot(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    /// Returns the vehicle covering `cell`.
    ///
    /// # Arguments
    /// * `cell`: Any cell; out-of-bounds cells are treated as empty.
    ///
    /// # Returns
    /// `Some(vehicle)` if a vehicle occupies `cell`, `None` otherwise.
    pub fn occupant(&self, cell: Cell) -> Option<&Vehicle> {
        if !self.contains(cell) {
            return None;
        }
        self.occupancy[self.slot(cell)].map(|index| &self.vehicles[index])
    }

    /// True iff `cell` is on the board and no vehicle covers it.
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.contains(cell) && self.occupancy[self.slot(cell)].is_none()
    }

    /// The coordinate, along the goal vehicle's axis, of the exit edge: the
    /// last column for a horizontal goal, the last row for a vertical one.
    pub fn exit_coordinate(&self) -> usize {
        match self.goal().orientation {
            Orientation::Horizontal => self.width - 1,
            Orientation::Vertical => self.height - 1,
        }
    }

    /// Cells strictly between the goal's leading end and the exit edge, nearest first.
    pub fn cells_toward_exit(&self) -> impl Iterator<Item = Cell> + '_ {
        let goal = self.goal();
        let (orientation, lead) = (goal.orientation, goal.end);
        let remaining = self.exit_coordinate() - orientation.coordinate(lead);
        (1..=remaining).filter_map(move |step| orientation.offset(lead, step as isize))
    }

    /// True iff the goal vehicle's leading cell sits on the exit edge.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::utils::board_from_str_array;
    /// let board = board_from_str_array(&["....XX", "......"]).unwrap();
    /// assert!(board.is_solved());
    /// ```
    pub fn is_solved(&self) -> bool {
        let goal = self.goal();
        goal.orientation.coordinate(goal.end) == self.exit_coordinate()
    }

    /// Computes the canonical key of this configuration.
    ///
    /// Only vehicle positions contribute; the occupancy index is derived from
    /// them and is left out.
    ///
    /// # Returns
    /// A [`Fingerprint`] equal to that of any other board from the same puzzle
    /// with every vehicle in the same place.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Direction, Move};
    /// use rush_hour_solver::utils::board_from_str_array;
    /// let board = board_from_str_array(&["XX..", "...."]).unwrap();
    /// let mut there_and_back = board.clone();
    /// there_and_back.apply(Move::new('X', Direction::Forward)).unwrap();
    /// assert_ne!(there_and_back.fingerprint(), board.fingerprint());
    /// there_and_back.apply(Move::new('X', Direction::Backward)).unwrap();
    /// assert_eq!(there_and_back.fingerprint(), board.fingerprint());
    /// ```
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(self.vehicles.iter().map(|v| self.slot(v.start)).collect())
    }

    /// Works out a single step of vehicle `index` without touching the board.
    ///
    /// # Returns
    /// `Some((moved, entering))`: the vehicle in its new position and the cell it
    /// newly covers. `None` if the vehicle is `Fixed`, the step would leave the
    /// board, or the entering cell is taken.
    fn slide(&self, index: usize, direction: Direction) -> Option<(Vehicle, Cell)> {
        let vehicle = &self.vehicles[index];
        if !vehicle.class.can_move() {
            return None;
        }
        let entering = vehicle
            .entering_cell(direction)
            .filter(|&cell| self.is_empty(cell))?;
        let moved = vehicle.shifted(direction)?;
        Some((moved, entering))
    }

    /// Installs a step computed by [`Board::slide`].
    ///
    /// Every fallible part of the move has already happened, so the vehicle
    /// list and the occupancy index are always updated together.
    fn commit(&mut self, index: usize, direction: Direction, moved: Vehicle, entering: Cell) {
        let vacated = self.slot(self.vehicles[index].vacated_cell(direction));
        let entered = self.slot(entering);
        self.vehicles[index] = moved;
        self.occupancy[vacated] = None;
        self.occupancy[entered] = Some(index);
    }

    /// Lists every legal single-step move.
    ///
    /// A move is legal when the vehicle is not `Fixed` and the cell just beyond
    /// its leading end (forward) or trailing end (backward) is on the board and
    /// empty.
    ///
    /// # Returns
    /// The moves in vehicle order, forward before backward. Empty when nothing
    /// can move.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (index, vehicle) in self.vehicles.iter().enumerate() {
            for direction in Direction::ALL {
                if self.slide(index, direction).is_some() {
                    moves.push(Move::new(vehicle.id, direction));
                }
            }
        }
        moves
    }

    /// Generates every legal single-step move together with its resulting board.
    ///
    /// `self` is left untouched; each successor is an independent clone, so the
    /// search can hold siblings side by side.
    ///
    /// # Returns
    /// `(move, successor)` pairs in the same order as [`Board::legal_moves`].
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Direction, Move};
    /// use rush_hour_solver::utils::board_from_str_array;
    /// let board = board_from_str_array(&["XX.."]).unwrap();
    /// let successors = board.successors();
    /// assert_eq!(successors.len(), 1);
    /// assert_eq!(successors[0].0, Move::new('X', Direction::Forward));
    /// assert_eq!(successors[0].1.to_string(), ".XX.");
    /// ```
    pub fn successors(&self) -> Vec<(Move, Board)> {
        let mut successors = Vec::new();
        for index in 0..self.vehicles.len() {
            for direction in Direction::ALL {
                if let Some((moved, entering)) = self.slide(index, direction) {
                    let mut next = self.clone();
                    next.commit(index, direction, moved, entering);
                    successors.push((Move::new(moved.id, direction), next));
                }
            }
        }
        successors
    }

    /// Applies `mv` in place.
    ///
    /// # Arguments
    /// * `mv`: The move to make; it has to be legal in the current position.
    ///
    /// # Errors
    /// `SolveError::IllegalMove` if the vehicle does not exist, is `Fixed`, or
    /// the target cell is blocked or off the board. The board is unchanged on error.
    pub fn apply(&mut self, mv: Move) -> Result<()> {
        let illegal = SolveError::IllegalMove {
            vehicle: mv.vehicle,
            direction: mv.direction,
        };
        let index = self
            .vehicles
            .iter()
            .position(|v| v.id == mv.vehicle)
            .ok_or_else(|| illegal.clone())?;
        let (moved, entering) = self.slide(index, mv.direction).ok_or(illegal)?;
        self.commit(index, mv.direction, moved, entering);
        Ok(())
    }

    /// Describes `mv` the way a player reads the board, e.g. `"A Down"`.
    ///
    /// Unknown vehicles fall back to the plain `Move` display.
    pub fn describe_move(&self, mv: Move) -> String {
        match self.vehicle(mv.vehicle) {
            Some(vehicle) => format!(
                "{} {}",
                mv.vehicle,
                mv.direction.screen_name(vehicle.orientation)
            ),
            None => mv.to_string(),
        }
    }

    /// Renders the current occupancy as a [`Grid`].
    pub fn grid(&self) -> Grid {
        Grid {
            height: self.height,
            width: self.width,
            cells: self
                .occupancy
                .iter()
                .map(|slot| slot.map(|index| self.vehicles[index].id))
                .collect(),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid())
    }
}

/// A plain occupancy snapshot: each cell holds the id of the vehicle covering it.
///
/// Unlike `Board`, a grid carries no vehicle metadata and is not validated; it
/// is what replay produces and what the binaries print.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Option<char>>,
}

impl Grid {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the vehicle id at `cell`.
    ///
    /// # Arguments
    /// * `cell`: The position to look up.
    ///
    /// # Returns
    /// `Some(id)` for a covered cell, `None` for empty or out-of-bounds cells.
    pub fn get(&self, cell: Cell) -> Option<char> {
        if cell.row < self.height && cell.col < self.width {
            self.cells[cell.row * self.width + cell.col]
        } else {
            None
        }
    }

    /// Empties every in-bounds cell of `cells`.
    ///
    /// # Arguments
    /// * `cells`: Positions to clear; out-of-bounds ones are ignored.
    pub fn clear<I: IntoIterator<Item = Cell>>(&mut self, cells: I) {
        for cell in cells {
            if cell.row < self.height && cell.col < self.width {
                self.cells[cell.row * self.width + cell.col] = None;
            }
        }
    }

    /// Marks every in-bounds cell of `cells` as covered by `id`.
    ///
    /// # Arguments
    /// * `id`: The vehicle letter to write.
    /// * `cells`: Positions to fill; out-of-bounds ones are ignored.
    pub fn fill<I: IntoIterator<Item = Cell>>(&mut self, id: char, cells: I) {
        for cell in cells {
            if cell.row < self.height && cell.col < self.width {
                self.cells[cell.row * self.width + cell.col] = Some(id);
            }
        }
    }

    /// Converts the grid back into the loader's text format.
    ///
    /// # Returns
    /// One `String` per row, using `.` for empty cells. Feeding the result to
    /// `utils::board_from_str_array` rebuilds an equivalent board.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|c| c.unwrap_or('.')).collect())
            .collect()
    }

    /// Renders the grid with ANSI background colours for terminal output.
    ///
    /// The goal vehicle (`X`) is red, fixed vehicles (lowercase ids) grey and
    /// all others blue. Empty cells are black.
    ///
    /// # Arguments
    /// * `highlight`: A vehicle id to draw in yellow instead, typically the one
    ///   that just moved. `None` highlights nothing.
    ///
    /// # Returns
    /// A `String` with one line per row and no trailing newline.
    pub fn to_string_with_highlight(&self, highlight: Option<char>) -> String {
        let mut output = String::new();
        for (r_idx, row) in self.cells.chunks(self.width).enumerate() {
            for cell in row {
                // Highlight wins over the class colours, including for `X`.
                let color_code = match cell {
                    None => "40",
                    Some(id) if Some(*id) == highlight => "43",
                    Some('X') => "41",
                    Some(id) if id.is_lowercase() => "47",
                    Some(_) => "44",
                };
                let label = cell.unwrap_or(' ');
                output.push_str(&format!("\x1b[1;{};m{} \x1b[m", color_code, label));
            }
            if r_idx + 1 < self.height {
                output.push('\n');
            }
        }
        output
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{board_from_str_array, random_puzzle_with_seed};
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn goal_car(start: Cell, end: Cell) -> Vehicle {
        Vehicle::new('X', VehicleClass::Goal, start, end).unwrap()
    }

    /// Checks that every vehicle is on the board, that no two overlap, and that
    /// the occupancy index agrees with the vehicle list.
    fn assert_consistent(board: &Board) {
        let grid = board.grid();
        let covered = (0..board.height())
            .flat_map(|r| (0..board.width()).map(move |c| Cell::new(r, c)))
            .filter(|&cell| grid.get(cell).is_some())
            .count();
        let expected = board.vehicles().iter().map(Vehicle::len).sum::<usize>();
        assert_eq!(covered, expected, "a vehicle lost or doubled a cell");
        for vehicle in board.vehicles() {
            for cell in vehicle.cells() {
                assert!(board.contains(cell));
                assert_eq!(board.occupant(cell).map(Vehicle::id), Some(vehicle.id()));
            }
        }
    }

    #[test]
    fn test_vehicle_orientation_and_cells() {
        let car = Vehicle::new('A', VehicleClass::Movable, Cell::new(2, 1), Cell::new(2, 3)).unwrap();
        assert_eq!(car.orientation(), Orientation::Horizontal);
        assert_eq!(car.len(), 3);
        let cells: Vec<Cell> = car.cells().collect();
        assert_eq!(cells, vec![Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3)]);

        let truck = Vehicle::new('B', VehicleClass::Movable, Cell::new(0, 4), Cell::new(2, 4)).unwrap();
        assert_eq!(truck.orientation(), Orientation::Vertical);
        assert_eq!(truck.entering_cell(Direction::Forward), Some(Cell::new(3, 4)));
        assert_eq!(truck.entering_cell(Direction::Backward), None);
        assert_eq!(truck.vacated_cell(Direction::Forward), Cell::new(0, 4));
    }

    #[test]
    fn test_vehicle_rejects_misaligned_cells() {
        let diagonal = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 0), Cell::new(1, 1));
        assert!(matches!(diagonal, Err(SolveError::MisalignedVehicle { vehicle: 'A', .. })));

        let reversed = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 3), Cell::new(0, 1));
        assert!(reversed.is_err());
    }

    #[test]
    fn test_single_cell_vehicle_keeps_given_axis() {
        let pawn = Vehicle::single('P', VehicleClass::Movable, Cell::new(1, 1), Orientation::Vertical);
        assert_eq!(pawn.len(), 1);
        assert_eq!(pawn.entering_cell(Direction::Forward), Some(Cell::new(2, 1)));
        assert_eq!(pawn.entering_cell(Direction::Backward), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_board_new_validates_preconditions() {
        let car = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 0), Cell::new(0, 1)).unwrap();
        assert_eq!(Board::new(3, 3, vec![car]), Err(SolveError::MissingGoal));
        assert_eq!(Board::new(0, 3, vec![]), Err(SolveError::EmptyBoard));

        let goal = goal_car(Cell::new(1, 0), Cell::new(1, 1));
        let other_goal = Vehicle::new('Y', VehicleClass::Goal, Cell::new(2, 0), Cell::new(2, 1)).unwrap();
        assert_eq!(
            Board::new(3, 3, vec![goal, other_goal]),
            Err(SolveError::MultipleGoals { first: 'X', second: 'Y' })
        );

        let overlapping = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 1), Cell::new(2, 1)).unwrap();
        assert_eq!(
            Board::new(3, 3, vec![goal, overlapping]),
            Err(SolveError::OverlappingVehicles {
                first: 'X',
                second: 'A',
                cell: Cell::new(1, 1)
            })
        );

        let too_long = Vehicle::new('A', VehicleClass::Movable, Cell::new(0, 2), Cell::new(0, 3)).unwrap();
        assert!(matches!(
            Board::new(3, 3, vec![goal, too_long]),
            Err(SolveError::OutOfBounds { vehicle: 'A', .. })
        ));

        assert_eq!(
            Board::new(3, 3, vec![goal, goal]),
            Err(SolveError::DuplicateVehicle('X'))
        );
    }

    #[test]
    fn test_occupancy_lookup() {
        let board = board_from_str_array(&["A.....", "A.....", "XX...."]).unwrap();
        assert_eq!(board.occupant(Cell::new(1, 0)).map(Vehicle::id), Some('A'));
        assert_eq!(board.occupant(Cell::new(2, 1)).map(Vehicle::id), Some('X'));
        assert!(board.occupant(Cell::new(0, 3)).is_none());
        assert!(board.occupant(Cell::new(9, 9)).is_none());
        assert!(!board.is_empty(Cell::new(9, 9)));
    }

    #[test]
    fn test_successors_respect_bounds_and_blockers() {
        let board = board_from_str_array(&[
            "..A...",
            "..A...",
            "XX.BB.",
        ])
        .unwrap();
        let moves: Vec<Move> = board.successors().into_iter().map(|(mv, _)| mv).collect();
        assert_eq!(
            moves,
            vec![
                Move::new('A', Direction::Forward),
                Move::new('B', Direction::Forward),
                Move::new('B', Direction::Backward),
                Move::new('X', Direction::Forward),
            ]
        );
        assert_eq!(board.legal_moves(), moves);
    }

    #[test]
    fn test_successors_do_not_mutate_input() {
        let board = board_from_str_array(&["......", "XX....", "......"]).unwrap();
        let before = board.clone();
        let successors = board.successors();
        assert_eq!(board, before);
        assert_eq!(successors.len(), 1);
        let (mv, next) = &successors[0];
        assert_eq!(*mv, Move::new('X', Direction::Forward));
        assert_eq!(next.goal().start(), Cell::new(1, 1));
        assert_eq!(next.goal().end(), Cell::new(1, 2));
        assert!(next.is_empty(Cell::new(1, 0)));
        assert_ne!(board.fingerprint(), next.fingerprint());
    }

    #[test]
    fn test_fixed_vehicles_never_move() {
        let board = board_from_str_array(&[
            "......",
            "..a...",
            "XX....",
        ])
        .unwrap();
        assert!(board.legal_moves().iter().all(|mv| mv.vehicle != 'a'));
        let mut board = board;
        assert_eq!(
            board.apply(Move::new('a', Direction::Forward)),
            Err(SolveError::IllegalMove {
                vehicle: 'a',
                direction: Direction::Forward
            })
        );
    }

    #[test]
    fn test_successors_never_overlap() {
        let board = board_from_str_array(&[
            "AA...O",
            "P..Q.O",
            "PXXQ.O",
            "P..Q..",
            "B...CC",
            "B.RRR.",
        ])
        .unwrap();
        for (_, next) in board.successors() {
            assert_consistent(&next);
        }
    }

    #[test]
    fn test_reachable_states_keep_invariants() {
        for seed in 0..20 {
            let start = random_puzzle_with_seed(seed, 10, 0).unwrap();
            let fixed: Vec<Vehicle> = start
                .vehicles()
                .iter()
                .filter(|v| v.class() == VehicleClass::Fixed)
                .copied()
                .collect();
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut current = start.clone();

            for _ in 0..80 {
                let successors = current.successors();
                for (mv, next) in &successors {
                    assert_consistent(next);
                    assert_ne!(next.vehicle(mv.vehicle).map(Vehicle::class), Some(VehicleClass::Fixed));
                    for vehicle in &fixed {
                        assert_eq!(next.vehicle(vehicle.id()), Some(vehicle), "seed {}", seed);
                    }
                    // Only the moved vehicle changed.
                    for (before, after) in current.vehicles().iter().zip(next.vehicles()) {
                        if before.id() != mv.vehicle {
                            assert_eq!(before, after);
                        }
                    }
                }
                let Some((_, next)) = successors.choose(&mut rng) else {
                    break;
                };
                current = next.clone();
            }
        }
    }

    #[test]
    fn test_fingerprint_identifies_configurations() {
        let start = random_puzzle_with_seed(3, 6, 0).unwrap();
        let mut seen: HashMap<Fingerprint, Board> = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut current = start;
        for _ in 0..200 {
            if let Some(previous) = seen.get(&current.fingerprint()) {
                assert_eq!(previous, &current);
            }
            seen.insert(current.fingerprint(), current.clone());
            let moves = current.legal_moves();
            let Some(&mv) = moves.choose(&mut rng) else {
                break;
            };
            current.apply(mv).unwrap();
        }
        // Random walks revisit positions; equal fingerprints always meant equal boards.
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_apply_and_reverse_restores_fingerprint() {
        let mut board = board_from_str_array(&["......", ".XX...", "......"]).unwrap();
        let original = board.fingerprint();
        board.apply(Move::new('X', Direction::Backward)).unwrap();
        assert_ne!(board.fingerprint(), original);
        board.apply(Move::new('X', Direction::Forward)).unwrap();
        assert_eq!(board.fingerprint(), original);

        let mut edge = board_from_str_array(&["XX...."]).unwrap();
        assert!(edge.apply(Move::new('X', Direction::Backward)).is_err());
        assert!(edge.apply(Move::new('Q', Direction::Forward)).is_err());
    }

    #[test]
    fn test_failed_apply_leaves_board_unchanged() {
        let mut board = board_from_str_array(&["A.....", "A.....", "XXb..."]).unwrap();
        let before = board.clone();
        assert!(board.apply(Move::new('A', Direction::Forward)).is_err());
        assert!(board.apply(Move::new('A', Direction::Backward)).is_err());
        assert!(board.apply(Move::new('X', Direction::Forward)).is_err());
        assert_eq!(board, before);
        assert_consistent(&board);
    }

    #[test]
    fn test_goal_test_horizontal_and_vertical() {
        let solved = board_from_str_array(&["......", "....XX"]).unwrap();
        assert!(solved.is_solved());
        let unsolved = board_from_str_array(&["......", "...XX."]).unwrap();
        assert!(!unsolved.is_solved());

        let goal = Vehicle::new('X', VehicleClass::Goal, Cell::new(1, 0), Cell::new(2, 0)).unwrap();
        let vertical = Board::new(3, 2, vec![goal]).unwrap();
        assert_eq!(vertical.exit_coordinate(), 2);
        assert!(vertical.is_solved());
    }

    #[test]
    fn test_cells_toward_exit() {
        let board = board_from_str_array(&["......", ".XX...", "......"]).unwrap();
        let ahead: Vec<Cell> = board.cells_toward_exit().collect();
        assert_eq!(ahead, vec![Cell::new(1, 3), Cell::new(1, 4), Cell::new(1, 5)]);

        let solved = board_from_str_array(&["....XX"]).unwrap();
        assert_eq!(solved.cells_toward_exit().count(), 0);
    }

    #[test]
    fn test_describe_move_uses_vehicle_axis() {
        let board = board_from_str_array(&["A.....", "A.XX.."]).unwrap();
        assert_eq!(board.describe_move(Move::new('X', Direction::Forward)), "X Right");
        assert_eq!(board.describe_move(Move::new('X', Direction::Backward)), "X Left");
        assert_eq!(board.describe_move(Move::new('A', Direction::Forward)), "A Down");
        assert_eq!(board.describe_move(Move::new('A', Direction::Backward)), "A Up");
        assert_eq!(board.describe_move(Move::new('Z', Direction::Forward)), "Z forward");
    }

    #[test]
    fn test_grid_display_matches_input_format() {
        let rows = ["AA...O", "..XX.O", "b....O"];
        let board = board_from_str_array(&rows).unwrap();
        assert_eq!(board.to_string(), rows.join("\n"));
        assert_eq!(board.grid().rows(), rows.to_vec());
    }

    #[test]
    fn test_grid_clear_and_fill() {
        let board = board_from_str_array(&["XX...."]).unwrap();
        let mut grid = board.grid();
        grid.clear([Cell::new(0, 0), Cell::new(0, 1)]);
        grid.fill('X', [Cell::new(0, 1), Cell::new(0, 2)]);
        assert_eq!(grid.to_string(), ".XX...");
        assert_eq!(grid.get(Cell::new(0, 9)), None);
    }

    #[test]
    fn test_to_string_with_highlight_uses_ansi_codes() {
        let board = board_from_str_array(&["XXA", "..A"]).unwrap();
        let plain = board.grid().to_string_with_highlight(None);
        assert!(plain.contains("\x1b[1;41;mX"));
        assert!(plain.contains("\x1b[1;44;mA"));
        let highlighted = board.grid().to_string_with_highlight(Some('A'));
        assert!(highlighted.contains("\x1b[1;43;mA"));
        assert_eq!(highlighted.lines().count(), 2);
    }
}
