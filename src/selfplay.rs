//! Self-play game generation.
//!
//! Plays full games between bots that follow a fixed cash-reserve policy,
//! recording every action and roll. Used to smoke-test the engine over
//! long games and to collect statistics on game length and outcomes.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::board::{Board, Property, MAX_HOUSES};
use crate::game::{ActionReport, Game, GameError, GameOver, GameSnapshot, TurnOutcome};
use crate::rules::Rules;

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Bots per game.
    pub players: usize,
    /// Rolls after which an unfinished game is abandoned.
    pub max_turns: usize,
    /// Cash a bot keeps back when buying. Building and unmortgaging keep
    /// twice this.
    pub reserve: i64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Base seed; game `i` uses `seed + i` (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
    pub rules: Rules,
    /// Layout every game is played on.
    pub board: Board,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            players: 4,
            max_turns: 1000,
            reserve: 200,
            threads: 4,
            seed: 0,
            quiet: false,
            rules: Rules::default(),
            board: Board::standard(),
        }
    }
}

/// Everything that happened in one bot turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn: usize,
    /// Actions taken before rolling.
    pub actions: Vec<ActionReport>,
    /// `None` when the bot went bankrupt instead of rolling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<TurnOutcome>,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    /// Seed that replays this game.
    pub seed: u64,
    pub players: Vec<String>,
    /// Number of bot turns played.
    pub turns: usize,
    /// `None` if the turn cap was hit first.
    pub result: Option<GameOver>,
    pub final_state: GameSnapshot,
    pub history: Vec<TurnRecord>,
}

impl GameRecord {
    fn outcome_label(&self) -> String {
        match &self.result {
            Some(GameOver::Winner { name }) => format!("{} wins", name),
            Some(GameOver::Draw) => "draw".to_string(),
            None => "turn cap".to_string(),
        }
    }
}

/// Plays the current player's turn: raise cash or go bankrupt if in debt,
/// leave jail if worthwhile, buy and develop, then roll.
pub fn play_bot_turn(game: &mut Game, reserve: i64, turn: usize) -> Result<TurnRecord, GameError> {
    let mut actions = Vec::new();

    if !raise_funds(game, &mut actions)? {
        actions.push(game.declare_bankruptcy()?);
        return Ok(TurnRecord {
            turn,
            actions,
            roll: None,
        });
    }

    leave_jail(game, reserve, &mut actions);
    buy_current(game, reserve, &mut actions);
    develop(game, reserve, &mut actions);

    let roll = game.roll_turn()?;
    debug!(turn, action = %roll.action, "bot rolled");
    Ok(TurnRecord {
        turn,
        actions,
        roll: Some(roll),
    })
}

/// Mortgages properties until the current player is out of debt. Returns
/// false if that is impossible.
fn raise_funds(game: &mut Game, actions: &mut Vec<ActionReport>) -> Result<bool, GameError> {
    loop {
        let Some(player) = game.current_player() else {
            return Err(GameError::NoPlayers);
        };
        if player.money >= 0 {
            return Ok(true);
        }
        let candidate = owned(game)
            .into_iter()
            .filter(|p| !p.mortgaged)
            .min_by_key(|p| p.rent())
            .map(|p| p.name.clone());
        match candidate {
            Some(name) => actions.push(game.mortgage(&name)?),
            None => return Ok(false),
        }
    }
}

fn leave_jail(game: &mut Game, reserve: i64, actions: &mut Vec<ActionReport>) {
    let fine = game.rules().jail_fine;
    let Some(player) = game.current_player() else {
        return;
    };
    if !player.in_jail {
        return;
    }
    let report = if player.jail_free_cards > 0 {
        game.use_jail_free_card()
    } else if player.money - fine >= reserve {
        game.pay_jail_fine()
    } else {
        return;
    };
    actions.extend(report.ok());
}

fn buy_current(game: &mut Game, reserve: i64, actions: &mut Vec<ActionReport>) {
    let Some(player) = game.current_player() else {
        return;
    };
    let board = game.board();
    let affordable = board
        .tile(player.position)
        .property()
        .and_then(|id| board.property(id))
        .is_some_and(|p| p.owner.is_none() && player.money - p.cost >= reserve);
    if affordable {
        actions.extend(game.buy_current_space().ok());
    }
}

/// Builds at most one house or hotel and lifts at most one mortgage.
fn develop(game: &mut Game, reserve: i64, actions: &mut Vec<ActionReport>) {
    let margin = reserve * 2;
    let Some(money) = game.current_player().map(|p| p.money) else {
        return;
    };

    let build = owned(game)
        .into_iter()
        .filter(|p| !p.mortgaged && !p.hotel)
        .find_map(|p| {
            if p.houses < MAX_HOUSES && money - p.house_cost() >= margin {
                Some((p.name.clone(), false))
            } else if p.houses == MAX_HOUSES && money - p.hotel_cost() >= margin {
                Some((p.name.clone(), true))
            } else {
                None
            }
        });
    if let Some((name, hotel)) = build {
        let report = if hotel {
            game.build_hotel(&name)
        } else {
            game.build_house(&name)
        };
        actions.extend(report.ok());
    }

    let Some(money) = game.current_player().map(|p| p.money) else {
        return;
    };
    let lift = owned(game)
        .into_iter()
        .find(|p| p.mortgaged && money - p.unmortgage_fee() >= margin)
        .map(|p| p.name.clone());
    if let Some(name) = lift {
        actions.extend(game.unmortgage(&name).ok());
    }
}

/// Properties held by the current player.
fn owned(game: &Game) -> Vec<&Property> {
    let Some(player) = game.current_player() else {
        return Vec::new();
    };
    player
        .properties
        .iter()
        .filter_map(|id| game.board().property(*id))
        .collect()
}

/// Plays a single game to a result or the turn cap.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, seed: u64) -> Result<GameRecord, GameError> {
    let rules = Rules {
        seed: Some(seed),
        ..config.rules.clone()
    };
    let mut game = Game::with_board(rules, config.board.clone());
    let names: Vec<String> = (1..=config.players).map(|i| format!("bot{}", i)).collect();
    let players = game.start(&names)?;

    let mut history = Vec::new();
    while !game.is_ended() && history.len() < config.max_turns {
        let record = play_bot_turn(&mut game, config.reserve, history.len() + 1)?;
        history.push(record);
    }

    Ok(GameRecord {
        game_id,
        seed,
        players,
        turns: history.len(),
        result: game.result().cloned(),
        final_state: game.snapshot(),
        history,
    })
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    });
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play generation, calling `on_game` with each completed game record.
///
/// This allows the caller to process games incrementally (e.g. write to disk)
/// rather than waiting for all games to finish. With several threads the
/// records arrive in completion order.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

/// Seed for game `i`.
fn game_seed(config: &SelfPlayConfig, i: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(i as u64)
    } else {
        SmallRng::from_entropy().gen()
    }
}

/// Plays game `i` and logs its outcome. Failures are logged and dropped.
fn play_and_report(config: &SelfPlayConfig, i: usize, completed: &AtomicUsize) -> Option<GameRecord> {
    let game_start = Instant::now();
    let game = match play_game(config, i, game_seed(config, i)) {
        Ok(game) => game,
        Err(err) => {
            error!(game = i, error = %err, "self-play game failed");
            return None;
        }
    };
    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
    if !config.quiet {
        info!(
            "Game {}/{}: {} after {} turns ({:.2}s)",
            n,
            config.num_games,
            game.outcome_label(),
            game.turns,
            game_start.elapsed().as_secs_f64(),
        );
    }
    Some(game)
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    let completed = AtomicUsize::new(0);
    for i in 0..config.num_games {
        if let Some(game) = play_and_report(config, i, &completed) {
            on_game(game);
        }
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "failed to build thread pool; playing sequentially");
            return run_self_play_sequential(config, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();
    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    if let Some(game) = play_and_report(&config_clone, i, &completed) {
                        let _ = tx.send(game);
                    }
                });
        });
    });

    // Receive completed games on the main thread and pass to callback.
    for game in rx {
        on_game(game);
    }

    if handle.join().is_err() {
        error!("self-play worker thread panicked");
    }
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()
}

/// Writes a single game record as one JSON line.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)
}

/// Aggregate statistics over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub capped: usize,
    pub avg_turns: f64,
    /// Wins per seat, by player name.
    pub wins_by_player: Vec<(String, usize)>,
}

impl Summary {
    pub fn new(games: &[GameRecord]) -> Self {
        let mut summary = Summary {
            games: games.len(),
            ..Summary::default()
        };
        let mut total_turns = 0usize;
        for game in games {
            total_turns += game.turns;
            match &game.result {
                Some(GameOver::Winner { name }) => {
                    summary.wins += 1;
                    match summary.wins_by_player.iter_mut().find(|(n, _)| n == name) {
                        Some((_, count)) => *count += 1,
                        None => summary.wins_by_player.push((name.clone(), 1)),
                    }
                }
                Some(GameOver::Draw) => summary.draws += 1,
                None => summary.capped += 1,
            }
        }
        summary.wins_by_player.sort();
        summary.avg_turns = total_turns as f64 / games.len().max(1) as f64;
        summary
    }
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let summary = Summary::new(games);
    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", summary.games);
    eprintln!("Avg turns/game: {:.1}", summary.avg_turns);
    eprintln!("Wins: {}", summary.wins);
    eprintln!("Draws: {}", summary.draws);
    eprintln!("Hit turn cap: {}", summary.capped);
    eprintln!("Win distribution:");
    for (name, wins) in &summary.wins_by_player {
        let pct = 100.0 * *wins as f64 / summary.games.max(1) as f64;
        eprintln!("  {:>8}: {} ({:.1}%)", name, wins, pct);
    }
}
