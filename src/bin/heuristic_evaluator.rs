use clap::Parser;
use rush_hour_solver::heuristics::HeuristicKind;
use rush_hour_solver::solver::{Algorithm, SearchEngine, SearchResult, SolverConfig};
use rush_hour_solver::utils::{init_logging, random_puzzle_with_seed};
use std::collections::HashMap;
use std::error::Error;
use tracing::warn;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares A* heuristics against breadth-first search on random puzzles", long_about = None)]
struct Args {
    /// Number of random boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Seed of the first board; board `i` uses `seed + i`
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Vehicles (besides the goal) to place on each board
    #[clap(long, default_value_t = 10)]
    vehicles: usize,

    /// Random moves applied to each solved layout
    #[clap(long, default_value_t = 200)]
    scramble_steps: usize,

    /// Per-search expansion budget
    #[clap(long, default_value_t = 500_000)]
    max_expansions: usize,

    #[clap(short, long)]
    verbose: bool,
}

#[derive(Default)]
struct Tally {
    expanded: Vec<usize>,
    suboptimal: usize,
    aborted: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut tallies: HashMap<HeuristicKind, Tally> = HashMap::new();
    let mut baseline_expanded: Vec<usize> = Vec::new();

    println!("Starting heuristic evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let board = random_puzzle_with_seed(current_seed, args.vehicles, args.scramble_steps)?;
        println!("\nEvaluating Board {} (Seed: {})\n{}", board_idx, current_seed, board);

        let baseline_config = SolverConfig::new(Algorithm::BreadthFirst, HeuristicKind::Zero)
            .with_max_expansions(args.max_expansions);
        let mut baseline = SearchEngine::new(baseline_config);
        let shortest = match baseline.solve(&board) {
            SearchResult::Solved(moves) => moves.len(),
            other => {
                warn!(seed = current_seed, result = %other, "baseline search did not solve the board, skipping");
                continue;
            }
        };
        baseline_expanded.push(baseline.expanded_nodes());
        println!(
            "  {:<24} Length: {:<4} Expanded: {}",
            "bfs",
            shortest,
            baseline.expanded_nodes()
        );

        for heuristic in HeuristicKind::ALL {
            let config = SolverConfig::new(Algorithm::AStar, heuristic).with_max_expansions(args.max_expansions);
            let mut engine = SearchEngine::new(config);
            let result = engine.solve(&board);
            let tally = tallies.entry(heuristic).or_default();
            match result.moves() {
                Some(moves) => {
                    tally.expanded.push(engine.expanded_nodes());
                    if moves.len() > shortest {
                        tally.suboptimal += 1;
                    }
                    println!(
                        "  {:<24} Length: {:<4} Expanded: {}",
                        format!("a-star/{}", heuristic),
                        moves.len(),
                        engine.expanded_nodes()
                    );
                }
                None => {
                    tally.aborted += 1;
                    println!("  {:<24} {}", format!("a-star/{}", heuristic), result);
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Boards solved by the baseline: {} of {}", baseline_expanded.len(), args.boards);
    println!("\n--- Average Expanded Nodes ---");

    let average = |values: &[usize]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<usize>() as f64 / values.len() as f64
        }
    };

    println!("Strategy {:<24}: Average Expanded = {:.2}", "bfs", average(&baseline_expanded));
    let mut rows: Vec<(HeuristicKind, f64)> = HeuristicKind::ALL
        .into_iter()
        .filter_map(|kind| tallies.get(&kind).map(|tally| (kind, average(&tally.expanded))))
        .collect();
    // Fewest expansions first
    rows.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    for (kind, avg) in rows {
        let tally = &tallies[&kind];
        println!(
            "Strategy {:<24}: Average Expanded = {:.2}, Suboptimal = {}, Aborted = {}",
            format!("a-star/{}", kind),
            avg,
            tally.suboptimal,
            tally.aborted
        );
    }
    Ok(())
}
