//! Dice and card-draw randomness.
//!
//! The engine never touches a global RNG. All randomness flows through the
//! `Randomness` trait so tests can replay exact dice sequences.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Seed used by `ScriptedRandomness` once its queues run dry.
const SCRIPT_FALLBACK_SEED: u64 = 0x5eed;

/// The two dice of a single roll, each in 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiceRoll(pub u8, pub u8);

impl DiceRoll {
    pub fn total(self) -> u8 {
        self.0 + self.1
    }

    pub fn is_doubles(self) -> bool {
        self.0 == self.1
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.0, self.1)
    }
}

/// Source of dice rolls and card draws.
pub trait Randomness: Send {
    /// Rolls two independent six-sided dice.
    fn roll(&mut self) -> DiceRoll;

    /// Picks an index uniformly from `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Production randomness backed by `SmallRng`.
#[derive(Debug, Clone)]
pub struct SeededRandomness {
    rng: SmallRng,
}

impl SeededRandomness {
    pub fn from_seed(seed: u64) -> Self {
        SeededRandomness {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SeededRandomness {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Seeds from `seed` if given, otherwise from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self::from_entropy(),
        }
    }
}

impl Randomness for SeededRandomness {
    fn roll(&mut self) -> DiceRoll {
        DiceRoll(self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays queued dice rolls and card picks in order.
///
/// When a queue is empty the value comes from a fixed-seed `SmallRng`, so a
/// script only needs to cover the rolls a test cares about.
#[derive(Debug, Clone)]
pub struct ScriptedRandomness {
    rolls: VecDeque<DiceRoll>,
    picks: VecDeque<usize>,
    fallback: SeededRandomness,
}

impl ScriptedRandomness {
    pub fn new() -> Self {
        ScriptedRandomness {
            rolls: VecDeque::new(),
            picks: VecDeque::new(),
            fallback: SeededRandomness::from_seed(SCRIPT_FALLBACK_SEED),
        }
    }

    /// Queues dice rolls given as `(die1, die2)` pairs.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        self.rolls.extend(rolls.into_iter().map(|(a, b)| DiceRoll(a, b)));
        self
    }

    /// Queues card-draw indices.
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl Default for ScriptedRandomness {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomness for ScriptedRandomness {
    fn roll(&mut self) -> DiceRoll {
        match self.rolls.pop_front() {
            Some(roll) => roll,
            None => self.fallback.roll(),
        }
    }

    fn pick(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(i) => i % len,
            None => self.fallback.pick(len),
        }
    }
}
