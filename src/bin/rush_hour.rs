use clap::Parser;
use rush_hour_solver::engine::{Board, Grid, Move};
use rush_hour_solver::solver::{replay, SearchEngine, SearchResult, SolverConfig};
use rush_hour_solver::utils::{board_from_str, init_logging};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file (one line per row, `.` for empty cells)
    board_file: PathBuf,

    /// Search algorithm: `bfs` or `a-star`
    #[clap(short, long, default_value = "a-star")]
    algorithm: String,

    /// Heuristic used by A*: `zero`, `distance`, `blocking` or `distance-plus-blocking`
    #[clap(long, default_value = "blocking")]
    heuristic: String,

    /// Give up after expanding this many nodes
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Give up after this many milliseconds
    #[clap(long)]
    time_limit_ms: Option<u64>,

    /// Print the grid after every move of the solution
    #[clap(short, long)]
    show_grids: bool,

    /// Colour grids with ANSI escapes, highlighting the vehicle that just moved
    #[clap(long)]
    color: bool,

    /// Log search progress at debug level
    #[clap(short, long)]
    verbose: bool,
}

fn read_board_file(path: &PathBuf) -> Result<Board, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    board_from_str(&content).map_err(|e| format!("Invalid board in {}: {}", path.display(), e))
}

fn render(grid: &Grid, highlight: Option<char>, color: bool) -> String {
    if color {
        grid.to_string_with_highlight(highlight)
    } else {
        grid.to_string()
    }
}

fn format_moves(board: &Board, moves: &[Move]) -> String {
    moves
        .iter()
        .map(|&mv| board.describe_move(mv))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_replay(board: &Board, moves: &[Move], color: bool) -> Result<(), Box<dyn Error>> {
    let grids = replay(board, moves)?;
    let mut current = board.clone();

    println!("Replay:\n{}", render(&grids[0], None, color));
    println!("Legal moves: {}\n", format_moves(&current, &current.legal_moves()));
    for (i, (mv, grid)) in moves.iter().zip(&grids[1..]).enumerate() {
        println!("Move {}: {}", i + 1, current.describe_move(*mv));
        current.apply(*mv)?;
        println!("{}", render(grid, Some(mv.vehicle), color));
        if !current.is_solved() {
            println!("Legal moves: {}", format_moves(&current, &current.legal_moves()));
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = SolverConfig::from_names(&args.algorithm, Some(args.heuristic.as_str()))?;
    if let Some(max_expansions) = args.max_expansions {
        config = config.with_max_expansions(max_expansions);
    }
    if let Some(ms) = args.time_limit_ms {
        config = config.with_time_limit(Duration::from_millis(ms));
    }
    debug!(?config, "resolved solver configuration");

    let board = read_board_file(&args.board_file)?;
    info!(
        height = board.height(),
        width = board.width(),
        vehicles = board.vehicles().len(),
        "loaded board from {}",
        args.board_file.display()
    );
    println!("Initial board state:\n{}\n", board);
    println!(
        "Searching with {} (heuristic: {})...\n",
        config.algorithm, config.heuristic
    );

    let mut engine = SearchEngine::new(config);
    let result = engine.solve(&board);

    match &result {
        SearchResult::Solved(moves) => {
            println!("Solution found:\n");
            println!("Moves ({}):", moves.len());
            if moves.is_empty() {
                println!("  No moves needed.");
            }
            for (i, mv) in moves.iter().enumerate() {
                println!("  Move {}: {}", i + 1, board.describe_move(*mv));
            }
            println!();
            if !config.guarantees_optimality() {
                println!("Note: heuristic '{}' does not guarantee a shortest solution.\n", config.heuristic);
            }
            if args.show_grids {
                print_replay(&board, moves, args.color)?;
            }
        }
        SearchResult::NoSolution => println!("No solution exists for this board.\n"),
        SearchResult::Aborted(reason) => println!("Search aborted: {}.\n", reason),
    }

    println!("{}", engine.stats());
    if let Some(moves) = result.moves() {
        println!("  Solution Length: {}", moves.len());
    }
    Ok(())
}
