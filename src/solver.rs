//! Breadth-first and A* search over board configurations.
//!
//! A [`SearchEngine`] owns its frontier, its visited set and its statistics for
//! the duration of one [`SearchEngine::solve`] call. States are deduplicated by
//! [`Fingerprint`], never by identity, and move paths are kept in an
//! append-only trail so each frontier node carries a single link instead of a
//! copy of its whole path.
use crate::engine::{Board, Fingerprint, Grid, Move};
use crate::error::{Result, SolveError};
use crate::heuristics::{HeuristicFn, HeuristicKind};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Search strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// FIFO frontier; always returns a shortest solution.
    BreadthFirst,
    /// Priority frontier ordered by `cost + heuristic`.
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::BreadthFirst, Algorithm::AStar];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "bfs",
            Algorithm::AStar => "a-star",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Algorithm::BreadthFirst => &["breadth-first"],
            Algorithm::AStar => &["a_star", "astar"],
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SolveError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name || algorithm.aliases().contains(&name))
            .ok_or_else(|| SolveError::UnknownAlgorithm(name.to_string()))
    }
}

/// Optional budget checked between dequeues. `None` means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop before expanding more than this many nodes.
    pub max_expansions: Option<usize>,
    /// Stop once this much wall-clock time has elapsed.
    pub time_limit: Option<Duration>,
}

/// Why a search stopped before reaching a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    ExpansionLimit(usize),
    TimeLimit(Duration),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::ExpansionLimit(limit) => write!(f, "expansion limit of {} reached", limit),
            AbortReason::TimeLimit(limit) => write!(f, "time limit of {:?} reached", limit),
        }
    }
}

/// Outcome of a solve call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// The moves leading from the initial board to a solved one (possibly empty).
    Solved(Vec<Move>),
    /// Every reachable configuration was explored without meeting the goal.
    NoSolution,
    /// The search budget ran out first; nothing is known about solvability.
    Aborted(AbortReason),
}

impl SearchResult {
    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SearchResult::Solved(moves) => Some(moves),
            SearchResult::NoSolution | SearchResult::Aborted(_) => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SearchResult::Solved(_))
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Solved(moves) => write!(f, "Solved({} moves)", moves.len()),
            SearchResult::NoSolution => write!(f, "NoSolution"),
            SearchResult::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// Everything a [`SearchEngine`] needs to know before it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    /// Only consulted by A*.
    pub heuristic: HeuristicKind,
    pub limits: SearchLimits,
}

impl Default for SolverConfig {
    /// A* with the blocking-count heuristic and no limits.
    fn default() -> Self {
        SolverConfig::new(Algorithm::AStar, HeuristicKind::BlockingCount)
    }
}

impl SolverConfig {
    pub fn new(algorithm: Algorithm, heuristic: HeuristicKind) -> Self {
        SolverConfig {
            algorithm,
            heuristic,
            limits: SearchLimits::default(),
        }
    }

    /// Resolves algorithm and heuristic names through their registries.
    ///
    /// A missing heuristic means [`HeuristicKind::Zero`].
    ///
    /// # Errors
    /// `UnknownAlgorithm` or `UnknownHeuristic` for names outside the registries.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::solver::{Algorithm, SolverConfig};
    /// let config = SolverConfig::from_names("a-star", Some("distance")).unwrap();
    /// assert_eq!(config.algorithm, Algorithm::AStar);
    /// assert!(SolverConfig::from_names("dfs", None).is_err());
    /// ```
    pub fn from_names(algorithm: &str, heuristic: Option<&str>) -> Result<Self> {
        let algorithm = algorithm.parse()?;
        let heuristic = match heuristic {
            Some(name) => name.parse()?,
            None => HeuristicKind::Zero,
        };
        Ok(SolverConfig::new(algorithm, heuristic))
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.limits.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.limits.time_limit = Some(time_limit);
        self
    }

    /// Whether a returned solution is guaranteed to be a shortest one.
    pub fn guarantees_optimality(&self) -> bool {
        match self.algorithm {
            Algorithm::BreadthFirst => true,
            Algorithm::AStar => self.heuristic.is_admissible(),
        }
    }
}

/// Counters collected during the most recent solve call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Dequeued nodes that passed the visited check and were not the goal.
    pub expanded_nodes: usize,
    /// Successors pushed onto the frontier.
    pub generated_nodes: usize,
    /// Nodes dropped because their fingerprint was already visited.
    pub duplicates_skipped: usize,
    /// Largest frontier size observed.
    pub max_frontier: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Expanded Nodes: {}", self.expanded_nodes)?;
        writeln!(f, "  Generated Nodes: {}", self.generated_nodes)?;
        writeln!(f, "  Duplicates Skipped: {}", self.duplicates_skipped)?;
        writeln!(f, "  Max Frontier: {}", self.max_frontier)?;
        write!(f, "  Elapsed (secs): {:.3}", self.elapsed.as_secs_f64())
    }
}

/// One edge of the search tree: the move taken and the link of the node it was taken from.
#[derive(Clone, Copy, Debug)]
struct Step {
    parent: Option<usize>,
    mv: Move,
}

/// Append-only store of every edge discovered during a solve call.
#[derive(Debug, Default)]
struct Trail {
    steps: Vec<Step>,
}

impl Trail {
    fn extend(&mut self, parent: Option<usize>, mv: Move) -> usize {
        self.steps.push(Step { parent, mv });
        self.steps.len() - 1
    }

    /// The moves from the root to `link`, in order.
    fn path(&self, mut link: Option<usize>) -> Vec<Move> {
        let mut moves = Vec::new();
        while let Some(index) = link {
            let step = self.steps[index];
            moves.push(step.mv);
            link = step.parent;
        }
        moves.reverse();
        moves
    }
}

#[derive(Debug)]
struct SearchNode {
    board: Board,
    fingerprint: Fingerprint,
    link: Option<usize>,
    cost: u32,
}

impl SearchNode {
    fn root(board: &Board) -> Self {
        SearchNode {
            fingerprint: board.fingerprint(),
            board: board.clone(),
            link: None,
            cost: 0,
        }
    }
}

/// A* frontier entry. The heap pops the lowest priority first and, among
/// equal priorities, the earliest insertion.
#[derive(Debug)]
struct Queued {
    priority: u32,
    sequence: u64,
    node: SearchNode,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for Queued {}

struct Budget {
    limits: SearchLimits,
    started: Instant,
}

impl Budget {
    fn start(limits: SearchLimits) -> Self {
        Budget {
            limits,
            started: Instant::now(),
        }
    }

    fn exhausted(&self, expanded: usize) -> Option<AbortReason> {
        if let Some(limit) = self.limits.max_expansions {
            if expanded >= limit {
                return Some(AbortReason::ExpansionLimit(limit));
            }
        }
        if let Some(limit) = self.limits.time_limit {
            if self.started.elapsed() >= limit {
                return Some(AbortReason::TimeLimit(limit));
            }
        }
        None
    }
}

/// Single-threaded solver. Reusable: each `solve` call starts from scratch and
/// replaces the statistics of the previous one.
#[derive(Debug)]
pub struct SearchEngine {
    config: SolverConfig,
    stats: SearchStats,
}

impl SearchEngine {
    pub fn new(config: SolverConfig) -> Self {
        SearchEngine {
            config,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Statistics of the most recent solve call.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn expanded_nodes(&self) -> usize {
        self.stats.expanded_nodes
    }

    /// Searches for a sequence of moves that brings the goal vehicle to the exit.
    ///
    /// `board` is the initial configuration and is not modified. The result is
    /// `NoSolution` when the reachable state space holds no solved board, and
    /// `Aborted` when the configured limits stop the search first.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(algorithm = %self.config.algorithm, heuristic = %self.config.heuristic)
    )]
    pub fn solve(&mut self, board: &Board) -> SearchResult {
        self.stats = SearchStats::default();
        let budget = Budget::start(self.config.limits);
        if self.config.algorithm == Algorithm::AStar && !self.config.heuristic.is_admissible() {
            debug!("heuristic is not admissible; the solution may not be the shortest");
        }

        let heuristic = self.config.heuristic.function();
        let result = match self.config.algorithm {
            Algorithm::BreadthFirst => self.breadth_first(board, &budget),
            Algorithm::AStar => self.a_star(board, heuristic, &budget),
        };
        self.stats.elapsed = budget.started.elapsed();

        match &result {
            SearchResult::Solved(moves) => info!(
                moves = moves.len(),
                expanded = self.stats.expanded_nodes,
                "solution found"
            ),
            SearchResult::NoSolution => {
                info!(expanded = self.stats.expanded_nodes, "frontier exhausted, no solution")
            }
            SearchResult::Aborted(reason) => {
                warn!(expanded = self.stats.expanded_nodes, %reason, "search aborted")
            }
        }
        result
    }

    fn breadth_first(&mut self, board: &Board, budget: &Budget) -> SearchResult {
        let mut frontier = VecDeque::new();
        let mut visited: HashSet<Fingerprint> = HashSet::new();
        let mut trail = Trail::default();
        frontier.push_back(SearchNode::root(board));

        while let Some(node) = frontier.pop_front() {
            if visited.contains(&node.fingerprint) {
                self.stats.duplicates_skipped += 1;
                continue;
            }
            if node.board.is_solved() {
                return SearchResult::Solved(trail.path(node.link));
            }
            if let Some(reason) = budget.exhausted(self.stats.expanded_nodes) {
                return SearchResult::Aborted(reason);
            }

            self.stats.expanded_nodes += 1;
            trace!(cost = node.cost, frontier = frontier.len(), "expanding");
            for (mv, next) in node.board.successors() {
                let fingerprint = next.fingerprint();
                if visited.contains(&fingerprint) {
                    self.stats.duplicates_skipped += 1;
                    continue;
                }
                let link = trail.extend(node.link, mv);
                frontier.push_back(SearchNode {
                    board: next,
                    fingerprint,
                    link: Some(link),
                    cost: node.cost + 1,
                });
                self.stats.generated_nodes += 1;
            }
            visited.insert(node.fingerprint);
            self.stats.max_frontier = self.stats.max_frontier.max(frontier.len());
        }

        SearchResult::NoSolution
    }

    fn a_star(&mut self, board: &Board, heuristic: HeuristicFn, budget: &Budget) -> SearchResult {
        let mut frontier = BinaryHeap::new();
        let mut closed: HashSet<Fingerprint> = HashSet::new();
        let mut trail = Trail::default();
        let mut sequence: u64 = 0;
        frontier.push(Queued {
            priority: heuristic(board),
            sequence,
            node: SearchNode::root(board),
        });

        while let Some(Queued { node, .. }) = frontier.pop() {
            // Discarded without a goal test: safe for consistent heuristics only.
            if closed.contains(&node.fingerprint) {
                self.stats.duplicates_skipped += 1;
                continue;
            }
            if node.board.is_solved() {
                return SearchResult::Solved(trail.path(node.link));
            }
            if let Some(reason) = budget.exhausted(self.stats.expanded_nodes) {
                return SearchResult::Aborted(reason);
            }

            self.stats.expanded_nodes += 1;
            trace!(cost = node.cost, frontier = frontier.len(), "expanding");
            for (mv, next) in node.board.successors() {
                let fingerprint = next.fingerprint();
                if closed.contains(&fingerprint) {
                    self.stats.duplicates_skipped += 1;
                    continue;
                }
                let cost = node.cost + 1;
                let priority = cost + heuristic(&next);
                sequence += 1;
                let link = trail.extend(node.link, mv);
                frontier.push(Queued {
                    priority,
                    sequence,
                    node: SearchNode {
                        board: next,
                        fingerprint,
                        link: Some(link),
                        cost,
                    },
                });
                self.stats.generated_nodes += 1;
            }
            closed.insert(node.fingerprint);
            self.stats.max_frontier = self.stats.max_frontier.max(frontier.len());
        }

        SearchResult::NoSolution
    }
}

/// Resolves `algorithm` and `heuristic` by name and solves `board` without limits.
///
/// # Errors
/// `UnknownAlgorithm` / `UnknownHeuristic`, raised before any search work.
pub fn solve(
    board: &Board,
    algorithm: &str,
    heuristic: Option<&str>,
) -> Result<(SearchResult, SearchStats)> {
    let mut engine = SearchEngine::new(SolverConfig::from_names(algorithm, heuristic)?);
    let result = engine.solve(board);
    Ok((result, engine.stats().clone()))
}

/// Replays `moves` from `board`, returning one grid per position.
///
/// The first grid is the initial board and the last the position after the
/// final move. Each step copies the previous grid, clears the moved vehicle's
/// old cells and fills its new ones.
///
/// # Errors
/// `IllegalMove` if a move cannot be made in the position it is replayed in.
///
/// # Examples
/// ```
/// use rush_hour_solver::engine::{Direction, Move};
/// use rush_hour_solver::solver::replay;
/// use rush_hour_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["XX.."]).unwrap();
/// let moves = [Move::new('X', Direction::Forward), Move::new('X', Direction::Forward)];
/// let grids = replay(&board, &moves).unwrap();
/// assert_eq!(grids.len(), 3);
/// assert_eq!(grids[2].to_string(), "..XX");
/// ```
pub fn replay(board: &Board, moves: &[Move]) -> Result<Vec<Grid>> {
    let mut current = board.clone();
    let mut grid = board.grid();
    let mut grids = Vec::with_capacity(moves.len() + 1);
    grids.push(grid.clone());

    for &mv in moves {
        let illegal = SolveError::IllegalMove {
            vehicle: mv.vehicle,
            direction: mv.direction,
        };
        let before = current.vehicle(mv.vehicle).copied().ok_or(illegal)?;
        current.apply(mv)?;
        let after = current.vehicle(mv.vehicle).copied().unwrap_or(before);
        grid.clear(before.cells());
        grid.fill(after.id(), after.cells());
        grids.push(grid.clone());
    }
    Ok(grids)
}
