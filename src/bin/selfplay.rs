//! Self-play game generation CLI.
//!
//! Plays bot-vs-bot games and writes one JSON record per game (JSONL).
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};

use landlord::board::Board;
use landlord::rules::Rules;
use landlord::selfplay::{self, SelfPlayConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play bot-vs-bot games and record them as JSONL")]
struct Args {
    /// Number of games to play.
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Bots per game.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=8))]
    players: u8,

    /// Rolls after which a game is abandoned.
    #[arg(long, default_value_t = 1000)]
    max_turns: usize,

    /// Cash each bot keeps back when buying.
    #[arg(long, default_value_t = 200)]
    reserve: i64,

    /// Number of parallel threads.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Random seed, 0 for entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output file path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress progress and summary output.
    #[arg(long)]
    quiet: bool,

    /// JSON file with house rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// JSON file with a custom board layout.
    #[arg(long)]
    board: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    let rules = match &args.rules {
        Some(path) => match Rules::load(path) {
            Ok(rules) => rules,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load rules");
                return ExitCode::FAILURE;
            }
        },
        None => Rules::default(),
    };
    let board = match &args.board {
        Some(path) => match Board::load(path) {
            Ok(board) => board,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load board");
                return ExitCode::FAILURE;
            }
        },
        None => Board::standard(),
    };

    let config = SelfPlayConfig {
        num_games: args.games,
        players: usize::from(args.players),
        max_turns: args.max_turns,
        reserve: args.reserve,
        threads: args.threads.max(1),
        seed: args.seed,
        quiet: args.quiet,
        rules,
        board,
    };

    if !config.quiet {
        info!(
            "Self-play: {} games, {} players, max {} turns, {} threads",
            config.num_games, config.players, config.max_turns, config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !config.quiet {
        info!(
            "Completed {} games in {:.1}s ({:.1} games/s)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        selfplay::print_summary(&games);
    }

    let written = match &args.output {
        Some(path) => File::create(path).and_then(|file| write_all(&games, BufWriter::new(file))),
        None => write_all(&games, BufWriter::new(io::stdout().lock())),
    };
    match written {
        Ok(()) => {
            if let (Some(path), false) = (&args.output, config.quiet) {
                info!("Wrote {} games to {}", games.len(), path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "failed to write output");
            ExitCode::FAILURE
        }
    }
}

fn write_all<W: Write>(games: &[selfplay::GameRecord], mut writer: W) -> io::Result<()> {
    selfplay::write_jsonl(games, &mut writer)
}
