//! Multi-game registry.
//!
//! Games are keyed by a `GameId` handed out at creation. The id map is
//! guarded by one lock and every game by its own, so actions on different
//! games never wait on each other while actions on the same game are
//! applied one at a time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::info;

use crate::game::Game;

/// Identifier of a game held by a `GameRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown game {0}")]
    UnknownGame(GameId),
}

#[derive(Default)]
struct Slots {
    next_id: u64,
    games: BTreeMap<GameId, Arc<Mutex<Game>>>,
}

/// Shared store of independent games.
#[derive(Default)]
pub struct GameRegistry {
    slots: Mutex<Slots>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a game and returns its new id.
    pub fn insert(&self, game: Game) -> GameId {
        let mut slots = self.slots();
        slots.next_id += 1;
        let id = GameId(slots.next_id);
        slots.games.insert(id, Arc::new(Mutex::new(game)));
        info!(game = %id, "game created");
        id
    }

    /// Handle to the game, for callers that need to hold it across calls.
    pub fn get(&self, id: GameId) -> Option<Arc<Mutex<Game>>> {
        self.slots().games.get(&id).cloned()
    }

    /// Runs `f` with exclusive access to one game.
    pub fn with_game<T>(&self, id: GameId, f: impl FnOnce(&mut Game) -> T) -> Result<T, RegistryError> {
        let game = self.get(id).ok_or(RegistryError::UnknownGame(id))?;
        let mut guard = game.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(&mut guard))
    }

    /// Drops a game. Handles already obtained through `get` stay usable.
    pub fn remove(&self, id: GameId) -> Result<(), RegistryError> {
        match self.slots().games.remove(&id) {
            Some(_) => {
                info!(game = %id, "game removed");
                Ok(())
            }
            None => Err(RegistryError::UnknownGame(id)),
        }
    }

    /// Ids of every live game, ascending.
    pub fn ids(&self) -> Vec<GameId> {
        self.slots().games.keys().copied().collect()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
