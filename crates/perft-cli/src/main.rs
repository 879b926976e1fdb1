mod suite;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chess_movegen::{
    perft_divide, perft_parallel, AttackTables, MagicNumbers, MagicSearchConfig, Position,
};
use chess_types::{Fen, Square};
use clap::{Args, Parser, Subcommand};
use suite::PerftSuite;
use tracing_subscriber::EnvFilter;

/// Published counts for the standard perft positions.
const BUNDLED_SUITE: &str = include_str!("../suites/standard.toml");

#[derive(Parser)]
#[command(name = "perft")]
#[command(about = "Bitboard move generator perft runner")]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Magic number search settings used to build the attack tables.
#[derive(Args)]
struct SearchArgs {
    /// Initial xorshift state for the magic search
    #[arg(long, global = true, default_value_t = MagicSearchConfig::default().seed)]
    seed: u32,
    /// Candidates tried per square before giving up
    #[arg(long, global = true, default_value_t = MagicSearchConfig::default().max_attempts)]
    max_attempts: u64,
}

impl SearchArgs {
    fn config(&self) -> MagicSearchConfig {
        MagicSearchConfig {
            seed: self.seed,
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes for one position
    Run {
        /// Position in Forsyth-Edwards Notation
        #[arg(short, long, default_value = Fen::STARTPOS)]
        fen: String,
        /// Search depth in plies
        #[arg(short, long, default_value = "5")]
        depth: u32,
        /// Print the node count below each legal root move
        #[arg(long)]
        divide: bool,
        /// Worker threads (defaults to available parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Verify every case of a suite file against its expected counts
    Suite {
        /// Suite file in TOML format (defaults to the bundled standard suite)
        path: Option<PathBuf>,
        /// Skip depths deeper than this
        #[arg(long)]
        max_depth: Option<u32>,
        /// Worker threads (defaults to available parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Run the magic number search and print the constants it finds
    Magics,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.search.config();

    match cli.command {
        Commands::Run {
            fen,
            depth,
            divide,
            threads,
        } => {
            let tables = build_tables(&config)?;
            let position =
                Position::from_fen(&fen).with_context(|| format!("Invalid FEN: {}", fen))?;
            run(&position, &tables, depth, divide, worker_count(threads));
        }
        Commands::Suite {
            path,
            max_depth,
            threads,
        } => {
            let suite = match &path {
                Some(path) => PerftSuite::load(path)
                    .with_context(|| format!("Failed to load suite {}", path.display()))?,
                None => PerftSuite::parse(BUNDLED_SUITE).context("Bundled suite is invalid")?,
            };
            let tables = build_tables(&config)?;
            run_suite(&suite, &tables, max_depth, worker_count(threads))?;
        }
        Commands::Magics => {
            let magics = MagicNumbers::discover(&config).context("Magic number search failed")?;
            print_magics("ROOK_MAGICS", &magics.rook);
            println!();
            print_magics("BISHOP_MAGICS", &magics.bishop);
        }
    }

    Ok(())
}

fn build_tables(config: &MagicSearchConfig) -> anyhow::Result<AttackTables> {
    AttackTables::build(config).context("Failed to build attack tables")
}

fn worker_count(threads: Option<usize>) -> usize {
    threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1)
        .max(1)
}

fn run(position: &Position, tables: &AttackTables, depth: u32, divide: bool, threads: usize) {
    let start = Instant::now();
    let nodes = if divide {
        let mut position = *position;
        let moves = perft_divide(&mut position, tables, depth);
        for (mv, count) in &moves {
            println!("{}: {}", mv, count);
        }
        println!();
        println!("Moves: {}", moves.len());
        moves.iter().map(|(_, count)| count).sum()
    } else {
        perft_parallel(position, tables, depth, threads)
    };
    let elapsed = start.elapsed();

    println!("Depth: {}", depth);
    println!("Nodes: {}", nodes);
    println!("Time: {:.3}s", elapsed.as_secs_f64());
    println!("Speed: {} nodes/s", nodes_per_second(nodes, elapsed));
}

fn run_suite(
    suite: &PerftSuite,
    tables: &AttackTables,
    max_depth: Option<u32>,
    threads: usize,
) -> anyhow::Result<()> {
    let mut checked = 0;
    let mut failures = 0;

    for case in &suite.cases {
        let position = Position::from_fen(&case.fen)
            .with_context(|| format!("Case '{}' has an invalid FEN", case.name))?;

        for (depth, expected) in case.depths() {
            if max_depth.is_some_and(|max| depth > max) {
                break;
            }
            let start = Instant::now();
            let nodes = perft_parallel(&position, tables, depth, threads);
            let elapsed = start.elapsed();
            checked += 1;

            if nodes == expected {
                tracing::info!(
                    "{} depth {}: {} nodes in {:.3}s",
                    case.name,
                    depth,
                    nodes,
                    elapsed.as_secs_f64()
                );
            } else {
                failures += 1;
                tracing::error!(
                    "{} depth {}: expected {} nodes, got {}",
                    case.name,
                    depth,
                    expected,
                    nodes
                );
            }
        }
    }

    println!("{} of {} counts matched", checked - failures, checked);
    if failures > 0 {
        bail!("{} perft counts did not match", failures);
    }
    Ok(())
}

fn nodes_per_second(nodes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (nodes as f64 / secs) as u64
    } else {
        nodes
    }
}

fn print_magics(name: &str, magics: &[u64; 64]) {
    println!("pub const {}: [u64; 64] = [", name);
    for sq in Square::all() {
        println!("    {:#018x}, // {}", magics[sq.index() as usize], sq);
    }
    println!("];");
}
