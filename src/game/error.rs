//! Engine error taxonomy.

use serde::Serialize;

use crate::board::Rejection;

/// How an adapter should treat a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A business rule refused the action; nothing changed.
    Precondition,
    /// A player or property name did not resolve.
    InvalidReference,
    /// The game cannot accept actions right now (no players, or over).
    Unavailable,
}

/// Errors returned by `Game` operations. State is never modified when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no players in game")]
    NoPlayers,

    #[error("game is over")]
    GameOver,

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("duplicate player name '{0}'")]
    DuplicatePlayer(String),

    #[error("invalid player name '{0}'")]
    InvalidPlayerName(String),

    #[error("player '{0}' cannot trade with themselves")]
    SelfTrade(String),

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NoPlayers | GameError::GameOver => ErrorKind::Unavailable,
            GameError::UnknownPlayer(_) | GameError::UnknownProperty(_) => ErrorKind::InvalidReference,
            GameError::DuplicatePlayer(_)
            | GameError::InvalidPlayerName(_)
            | GameError::SelfTrade(_)
            | GameError::Rejected(_) => ErrorKind::Precondition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(GameError::NoPlayers.kind(), ErrorKind::Unavailable);
        assert_eq!(GameError::GameOver.kind(), ErrorKind::Unavailable);
        assert_eq!(GameError::UnknownProperty("x".into()).kind(), ErrorKind::InvalidReference);
        assert_eq!(GameError::DuplicatePlayer("ana".into()).kind(), ErrorKind::Precondition);
        assert_eq!(GameError::InvalidPlayerName(String::new()).kind(), ErrorKind::Precondition);
        assert_eq!(
            GameError::from(Rejection::NotOwner).kind(),
            ErrorKind::Precondition
        );
    }

    #[test]
    fn rejection_message_is_transparent() {
        let err = GameError::from(Rejection::Mortgaged);
        assert_eq!(err.to_string(), "property is mortgaged");
    }
}
