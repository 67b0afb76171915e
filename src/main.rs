//! Landlord -- a property-trading board game engine on a line protocol.
//!
//! This binary reads commands from stdin and writes one JSON response per
//! command to stdout. Logs go to stderr.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use landlord::board::Board;
use landlord::engine::Engine;
use landlord::protocol::parser::{parse_command, Command};
use landlord::rules::Rules;

#[derive(Parser, Debug)]
#[command(author, version, about = "Property-trading board game engine")]
struct Args {
    /// JSON file with house rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// JSON file with a custom board layout for every game.
    #[arg(long)]
    board: Option<PathBuf>,

    /// Seed for dice and cards. Overrides the rules file.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

/// Runs the protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    let mut rules = match &args.rules {
        Some(path) => match Rules::load(path) {
            Ok(rules) => rules,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load rules");
                return ExitCode::FAILURE;
            }
        },
        None => Rules::default(),
    };
    if args.seed.is_some() {
        rules.seed = args.seed;
    }
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

    match run(Engine::with_board(rules, board)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "i/o failure");
            ExitCode::FAILURE
        }
    }
}

fn run(mut engine: Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    info!(game = %engine.active_game(), "engine ready");

    for line in stdin.lock().lines() {
        let line = line?;

        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(err) => {
                engine.handle_parse_error(&mut out, &err)?;
                continue;
            }
        };

        if cmd == Command::Quit {
            break;
        }
        engine.handle(cmd, &mut out)?;
    }
    Ok(())
}
