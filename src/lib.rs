//! Landlord engine library.
//!
//! Exposes the board and property economy, card decks, dice, the turn
//! engine, the multi-game registry, and the line protocol for use by
//! integration tests and the binary entry points.

pub mod board;
pub mod cards;
pub mod dice;
pub mod engine;
pub mod game;
pub mod protocol;
pub mod registry;
pub mod rules;
pub mod selfplay;
