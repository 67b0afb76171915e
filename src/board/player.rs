//! Per-participant game state.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use super::layout::Board;
use super::property::{transfer_ownership, PropertyId};

/// Index of a player in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlayerId(pub usize);

/// Number of consecutive doubles that sends a player to jail.
pub const DOUBLES_LIMIT: u8 = 3;

/// A participant in a game.
///
/// `money` is signed: rent and tax may push it below zero, and the balance
/// stays negative until the player raises funds or declares bankruptcy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub money: i64,
    pub position: usize,
    pub properties: BTreeSet<PropertyId>,
    pub bankrupt: bool,
    pub in_jail: bool,
    pub jail_turns: u32,
    pub doubles_count: u8,
    pub jail_free_cards: u32,
}

impl Player {
    /// Creates a player standing on GO with `money` in hand.
    pub fn new(id: PlayerId, name: impl Into<String>, money: i64) -> Self {
        Player {
            id,
            name: name.into(),
            money,
            position: 0,
            properties: BTreeSet::new(),
            bankrupt: false,
            in_jail: false,
            jail_turns: 0,
            doubles_count: 0,
            jail_free_cards: 0,
        }
    }

    /// Moves `steps` tiles (negative moves backwards), wrapping around the board.
    /// Passing GO this way pays nothing.
    pub fn move_by(&mut self, steps: i64, board_size: usize) {
        let size = board_size as i64;
        self.position = (self.position as i64 + steps).rem_euclid(size) as usize;
    }

    /// Adds `amount` (possibly negative) to the balance and returns whether
    /// the result is non-negative. A negative result is left in place. The
    /// balance saturates at the `i64` bounds.
    pub fn adjust_money(&mut self, amount: i64) -> bool {
        self.money = self.money.saturating_add(amount);
        self.money >= 0
    }

    /// Sends the player to jail and clears both jail and doubles counters.
    pub fn go_to_jail(&mut self, jail_position: usize) {
        self.position = jail_position;
        self.in_jail = true;
        self.jail_turns = 0;
        self.doubles_count = 0;
        info!(player = %self.name, "sent to jail");
    }

    /// Lets the player out of jail without moving.
    pub fn release_from_jail(&mut self) {
        self.in_jail = false;
        self.jail_turns = 0;
    }

    /// Marks the player bankrupt, zeroes the balance and hands every owned
    /// property back to the bank. Irreversible.
    pub fn declare_bankruptcy(&mut self, board: &mut Board) {
        self.bankrupt = true;
        self.money = 0;
        let owned: Vec<PropertyId> = self.properties.iter().copied().collect();
        for id in owned {
            if let Some(property) = board.property_mut(id) {
                transfer_ownership(property, Some(&mut *self), None);
            }
        }
        self.properties.clear();
        info!(player = %self.name, "declared bankruptcy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_wraps_both_directions() {
        let mut p = Player::new(PlayerId(0), "ana", 1500);
        p.move_by(20, 17);
        assert_eq!(p.position, 3);
        p.move_by(-5, 17);
        assert_eq!(p.position, 15);
        assert_eq!(p.money, 1500);
    }

    #[test]
    fn adjust_money_allows_negative() {
        let mut p = Player::new(PlayerId(0), "ana", 100);
        assert!(p.adjust_money(-100));
        assert!(!p.adjust_money(-1));
        assert_eq!(p.money, -1);
    }

    #[test]
    fn adjust_money_saturates() {
        let mut p = Player::new(PlayerId(0), "ana", i64::MAX);
        assert!(p.adjust_money(200));
        assert_eq!(p.money, i64::MAX);
        p.money = i64::MIN;
        assert!(!p.adjust_money(-50));
        assert_eq!(p.money, i64::MIN);
    }

    #[test]
    fn go_to_jail_resets_counters() {
        let mut p = Player::new(PlayerId(0), "ana", 1500);
        p.doubles_count = 2;
        p.jail_turns = 1;
        p.go_to_jail(9);
        assert_eq!(p.position, 9);
        assert!(p.in_jail);
        assert_eq!(p.jail_turns, 0);
        assert_eq!(p.doubles_count, 0);
    }

    #[test]
    fn bankruptcy_releases_everything() {
        let mut board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 1500);
        let id = board.property_by_name("Renzo House").map(|prop| prop.id).unwrap();
        board.property_mut(id).unwrap().buy(&mut p).unwrap();
        board.property_mut(id).unwrap().mortgage(&mut p).unwrap();

        p.declare_bankruptcy(&mut board);
        assert!(p.bankrupt);
        assert_eq!(p.money, 0);
        assert!(p.properties.is_empty());
        let prop = board.property(id).unwrap();
        assert_eq!(prop.owner, None);
        assert!(!prop.mortgaged);
    }
}
