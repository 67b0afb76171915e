//! Protocol session state.
//!
//! Holds the game registry, the game commands currently apply to, and the
//! rules and board layout new games are created with. Each command is answered with exactly
//! one JSON line.

use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::board::Board;
use crate::dice::SeededRandomness;
use crate::game::{Game, GameError};
use crate::protocol::{failure, success, Command, ParseError, ResponseKind};
use crate::registry::{GameId, GameRegistry, RegistryError};
use crate::rules::Rules;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    registry: Arc<GameRegistry>,
    active: GameId,
    rules: Rules,
    layout: Board,
}

impl Engine {
    /// Creates a session on the standard board with its own registry and
    /// one empty game.
    pub fn new(rules: Rules) -> Self {
        Self::with_board(rules, Board::standard())
    }

    /// Creates a session whose games are played on `layout`.
    pub fn with_board(rules: Rules, layout: Board) -> Self {
        Self::with_registry(Arc::new(GameRegistry::new()), rules, layout)
    }

    /// Creates a session on a shared registry, opening a fresh game in it.
    pub fn with_registry(registry: Arc<GameRegistry>, rules: Rules, layout: Board) -> Self {
        let active = registry.insert(Game::with_board(rules.clone(), layout.clone()));
        Engine {
            registry,
            active,
            rules,
            layout,
        }
    }

    pub fn active_game(&self) -> GameId {
        self.active
    }

    /// Dispatches one parsed command. `Quit` is left to the caller.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        match cmd {
            Command::IsReady => self.reply(out, &"readyok"),
            Command::SetOption { name, value } => self.handle_setoption(out, &name, value.as_deref()),
            Command::Open { id } => self.handle_open(out, id),
            Command::Close { id } => self.handle_close(out, GameId(id)),
            Command::Games => {
                let games = self.registry.ids();
                self.reply(out, &json!({ "games": games, "active": self.active }))
            }
            Command::NewGame { players } => {
                self.on_game(out, |g| g.start(&players).map(|roster| json!({ "players": roster })))
            }
            Command::Roll => self.on_game(out, Game::roll_turn),
            Command::State => self.on_game(out, |g| Ok(g.snapshot())),
            Command::Board => self.on_game(out, |g| Ok(g.property_listing())),
            Command::Buy => self.on_game(out, Game::buy_current_space),
            Command::House { property } => self.on_game(out, |g| g.build_house(&property)),
            Command::Hotel { property } => self.on_game(out, |g| g.build_hotel(&property)),
            Command::Mortgage { property } => self.on_game(out, |g| g.mortgage(&property)),
            Command::Unmortgage { property } => self.on_game(out, |g| g.unmortgage(&property)),
            Command::Trade {
                from,
                to,
                money,
                property,
            } => self.on_game(out, |g| g.trade(&from, &to, money, property.as_deref())),
            Command::Bankrupt => self.on_game(out, Game::declare_bankruptcy),
            Command::Forfeit => self.on_game(out, Game::forfeit),
            Command::UseCard => self.on_game(out, Game::use_jail_free_card),
            Command::PayFine => self.on_game(out, Game::pay_jail_fine),
            Command::Reset => self.on_game(out, |g| {
                g.reset();
                Ok(json!({ "reset": true }))
            }),
            Command::Quit => Ok(()),
        }
    }

    /// Reports a malformed command line.
    pub fn handle_parse_error<W: Write>(&self, out: &mut W, err: &ParseError) -> io::Result<()> {
        warn!(error = %err, "malformed command");
        self.fail(out, ResponseKind::Protocol, &err.to_string())
    }

    /// Updates the session rules and applies them to the active game. A new
    /// seed also reseeds the active game's dice and cards.
    fn handle_setoption<W: Write>(&mut self, out: &mut W, name: &str, value: Option<&str>) -> io::Result<()> {
        let mut rules = self.rules.clone();
        if let Err(err) = rules.set_option(name, value) {
            warn!(error = %err, "setoption rejected");
            return self.fail(out, ResponseKind::Protocol, &err.to_string());
        }
        let reseed = name.eq_ignore_ascii_case("seed");
        self.rules = rules;
        let applied = self.rules.clone();
        let applied_to_active = self.registry.with_game(self.active, |g| {
            if reseed {
                g.set_randomness(SeededRandomness::new(applied.seed));
            }
            g.set_rules(applied);
        });
        // A closed active game still accepts the option for future games.
        if let Err(RegistryError::UnknownGame(id)) = applied_to_active {
            debug!(game = %id, "active game closed; option kept for new games");
        }
        self.reply(out, &self.rules)
    }

    fn handle_open<W: Write>(&mut self, out: &mut W, id: Option<u64>) -> io::Result<()> {
        match id.map(GameId) {
            None => {
                let game = Game::with_board(self.rules.clone(), self.layout.clone());
                self.active = self.registry.insert(game);
            }
            Some(id) if self.registry.get(id).is_some() => self.active = id,
            Some(id) => {
                return self.fail(out, ResponseKind::InvalidReference, &format!("unknown game {}", id));
            }
        }
        self.reply(out, &json!({ "game": self.active }))
    }

    fn handle_close<W: Write>(&mut self, out: &mut W, id: GameId) -> io::Result<()> {
        match self.registry.remove(id) {
            Ok(()) => self.reply(out, &json!({ "closed": id })),
            Err(err) => self.fail(out, ResponseKind::InvalidReference, &err.to_string()),
        }
    }

    /// Runs a game action on the active game and reports its outcome.
    fn on_game<T, W, F>(&self, out: &mut W, f: F) -> io::Result<()>
    where
        T: Serialize,
        W: Write,
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        match self.registry.with_game(self.active, f) {
            Ok(Ok(result)) => self.reply(out, &result),
            Ok(Err(err)) => {
                warn!(game = %self.active, error = %err, "action rejected");
                self.fail(out, err.kind().into(), &err.to_string())
            }
            Err(err) => self.fail(out, ResponseKind::Unavailable, &err.to_string()),
        }
    }

    fn reply<T: Serialize, W: Write>(&self, out: &mut W, result: &T) -> io::Result<()> {
        match success(result) {
            Ok(line) => write_line(out, &line),
            Err(err) => {
                error!(error = %err, "failed to encode response");
                self.fail(out, ResponseKind::Unavailable, "failed to encode response")
            }
        }
    }

    fn fail<W: Write>(&self, out: &mut W, kind: ResponseKind, message: &str) -> io::Result<()> {
        let line = failure(kind, message).map_err(io::Error::other)?;
        write_line(out, &line)
    }
}

fn write_line<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    writeln!(out, "{}", line)?;
    out.flush()
}
