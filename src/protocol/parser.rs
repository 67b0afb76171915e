//! Command parser.
//!
//! Parses incoming protocol lines into structured `Command` variants that
//! the session loop can dispatch on. Commands are whitespace-separated
//! tokens; property names may contain spaces and take the rest of the line.

use tracing::warn;

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set a rule: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Create a game (no id) or switch to an existing one.
    Open { id: Option<u64> },

    /// Remove a game from the registry.
    Close { id: u64 },

    /// List the games in the registry.
    Games,

    /// Start a match in the active game with these players in turn order.
    NewGame { players: Vec<String> },

    /// Roll for the current player and resolve the turn.
    Roll,

    /// Report players and end state.
    State,

    /// Report every property.
    Board,

    /// Buy the tile the current player stands on.
    Buy,

    House { property: String },

    Hotel { property: String },

    Mortgage { property: String },

    Unmortgage { property: String },

    /// `from` hands `property` to `to`, who pays `money`.
    Trade {
        from: String,
        to: String,
        money: i64,
        property: Option<String>,
    },

    /// The current player declares bankruptcy.
    Bankrupt,

    /// The current player leaves the game.
    Forfeit,

    /// Spend a get-out-of-jail-free card.
    UseCard,

    /// Pay the fine to leave jail.
    PayFine,

    /// Drop all players from the active game.
    Reset,

    /// Terminate the engine process.
    Quit,
}

/// A recognized command whose arguments did not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {command}: expected '{usage}'")]
pub struct ParseError {
    pub command: &'static str,
    pub usage: &'static str,
}

impl ParseError {
    fn new(command: &'static str, usage: &'static str) -> Self {
        ParseError { command, usage }
    }
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for empty lines and unrecognized commands, which are
/// logged and otherwise ignored. Malformed arguments for known commands
/// return a `ParseError` so the caller can report it.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "isready" => Command::IsReady,
        "games" => Command::Games,
        "roll" => Command::Roll,
        "state" => Command::State,
        "board" => Command::Board,
        "buy" => Command::Buy,
        "bankrupt" => Command::Bankrupt,
        "forfeit" => Command::Forfeit,
        "usecard" => Command::UseCard,
        "payfine" => Command::PayFine,
        "reset" => Command::Reset,
        "quit" => Command::Quit,

        "setoption" => parse_setoption(&tokens)?,
        "open" => parse_open(&tokens)?,
        "close" => parse_close(&tokens)?,
        "newgame" => parse_newgame(&tokens)?,
        "house" => Command::House {
            property: rest(&tokens, 1).ok_or(ParseError::new("house", "house <property>"))?,
        },
        "hotel" => Command::Hotel {
            property: rest(&tokens, 1).ok_or(ParseError::new("hotel", "hotel <property>"))?,
        },
        "mortgage" => Command::Mortgage {
            property: rest(&tokens, 1).ok_or(ParseError::new("mortgage", "mortgage <property>"))?,
        },
        "unmortgage" => Command::Unmortgage {
            property: rest(&tokens, 1)
                .ok_or(ParseError::new("unmortgage", "unmortgage <property>"))?,
        },
        "trade" => parse_trade(&tokens)?,

        other => {
            warn!(command = other, "unknown command");
            return Ok(None);
        }
    };
    Ok(Some(cmd))
}

/// Joins the tokens from `start` on, or `None` if there are none.
fn rest(tokens: &[&str], start: usize) -> Option<String> {
    tokens.get(start..).filter(|t| !t.is_empty()).map(|t| t.join(" "))
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, ParseError> {
    let malformed = ParseError::new("setoption", "setoption name <id> [value <x>]");
    if tokens.len() < 3 || tokens[1] != "name" {
        return Err(malformed);
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            if name_parts.is_empty() {
                return Err(malformed);
            }
            (name_parts.join(" "), rest(tokens, vi + 1))
        }
        None => (tokens[2..].join(" "), None),
    };

    Ok(Command::SetOption { name, value })
}

/// Parses `open [<id>]`.
fn parse_open(tokens: &[&str]) -> Result<Command, ParseError> {
    match tokens {
        [_] => Ok(Command::Open { id: None }),
        [_, id] => id
            .parse()
            .map(|id| Command::Open { id: Some(id) })
            .map_err(|_| ParseError::new("open", "open [<game id>]")),
        _ => Err(ParseError::new("open", "open [<game id>]")),
    }
}

/// Parses `close <id>`.
fn parse_close(tokens: &[&str]) -> Result<Command, ParseError> {
    match tokens {
        [_, id] => id
            .parse()
            .map(|id| Command::Close { id })
            .map_err(|_| ParseError::new("close", "close <game id>")),
        _ => Err(ParseError::new("close", "close <game id>")),
    }
}

/// Parses `newgame <player> [<player> ...]`.
fn parse_newgame(tokens: &[&str]) -> Result<Command, ParseError> {
    if tokens.len() < 2 {
        return Err(ParseError::new("newgame", "newgame <player> [<player> ...]"));
    }
    let players = tokens[1..].iter().map(|t| t.to_string()).collect();
    Ok(Command::NewGame { players })
}

/// Parses `trade <from> <to> <money> [<property>]`.
fn parse_trade(tokens: &[&str]) -> Result<Command, ParseError> {
    let malformed = ParseError::new("trade", "trade <from> <to> <money> [<property>]");
    if tokens.len() < 4 {
        return Err(malformed);
    }
    let money = tokens[3].parse::<i64>().map_err(|_| malformed.clone())?;
    Ok(Command::Trade {
        from: tokens[1].to_string(),
        to: tokens[2].to_string(),
        money,
        property: rest(tokens, 4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn parse_bare_commands() {
        for (line, cmd) in [
            ("isready", Command::IsReady),
            ("games", Command::Games),
            ("roll", Command::Roll),
            ("state", Command::State),
            ("board", Command::Board),
            ("buy", Command::Buy),
            ("bankrupt", Command::Bankrupt),
            ("forfeit", Command::Forfeit),
            ("usecard", Command::UseCard),
            ("payfine", Command::PayFine),
            ("reset", Command::Reset),
            ("quit", Command::Quit),
        ] {
            assert_eq!(parse(line), cmd, "{}", line);
        }
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("\t"), Ok(None));
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), Ok(None));
    }

    #[test]
    fn parse_setoption_with_value() {
        assert_eq!(
            parse("setoption name StartingMoney value 2000"),
            Command::SetOption {
                name: "StartingMoney".to_string(),
                value: Some("2000".to_string()),
            }
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        assert_eq!(
            parse("setoption name MaxJailTurns"),
            Command::SetOption {
                name: "MaxJailTurns".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn parse_setoption_malformed() {
        assert!(parse_command("setoption").is_err());
        assert!(parse_command("setoption foo").is_err());
        assert!(parse_command("setoption name value 3").is_err());
    }

    #[test]
    fn parse_open_and_close() {
        assert_eq!(parse("open"), Command::Open { id: None });
        assert_eq!(parse("open 7"), Command::Open { id: Some(7) });
        assert_eq!(parse("close 7"), Command::Close { id: 7 });
        assert!(parse_command("open seven").is_err());
        assert!(parse_command("close").is_err());
    }

    #[test]
    fn parse_newgame_players() {
        assert_eq!(
            parse("newgame ana ben cat"),
            Command::NewGame {
                players: vec!["ana".into(), "ben".into(), "cat".into()],
            }
        );
        assert_eq!(
            parse_command("newgame"),
            Err(ParseError::new("newgame", "newgame <player> [<player> ...]"))
        );
    }

    #[test]
    fn parse_property_names_with_spaces() {
        assert_eq!(
            parse("house  Renzo   House "),
            Command::House {
                property: "Renzo House".into(),
            }
        );
        assert_eq!(
            parse("unmortgage Malate"),
            Command::Unmortgage {
                property: "Malate".into(),
            }
        );
        assert!(parse_command("mortgage").is_err());
    }

    #[test]
    fn parse_trade_forms() {
        assert_eq!(
            parse("trade ana ben 300 Crisostomo Plaza"),
            Command::Trade {
                from: "ana".into(),
                to: "ben".into(),
                money: 300,
                property: Some("Crisostomo Plaza".into()),
            }
        );
        assert_eq!(
            parse("trade ana ben 50"),
            Command::Trade {
                from: "ana".into(),
                to: "ben".into(),
                money: 50,
                property: None,
            }
        );
        assert!(parse_command("trade ana ben lots").is_err());
        assert!(parse_command("trade ana").is_err());
    }

    #[test]
    fn malformed_message() {
        let err = parse_command("close x").unwrap_err();
        assert_eq!(err.to_string(), "malformed close: expected 'close <game id>'");
    }
}
