//! Chance and Community Chest decks.
//!
//! Both decks are fixed tables. Drawing picks a card uniformly at random and
//! puts it straight back, so draws are independent and a deck never runs out.

use serde::Serialize;
use tracing::debug;

use crate::board::{Board, Player, Tile, TileKind};
use crate::dice::Randomness;

/// Which deck to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

impl DeckKind {
    pub const fn name(self) -> &'static str {
        match self {
            DeckKind::Chance => "Chance",
            DeckKind::CommunityChest => "Community Chest",
        }
    }

    /// The cards in this deck.
    pub fn cards(self) -> &'static [Card] {
        match self {
            DeckKind::Chance => &CHANCE_CARDS,
            DeckKind::CommunityChest => &COMMUNITY_CHEST_CARDS,
        }
    }
}

/// What a card does to the player who drew it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardEffect {
    /// Move to an absolute board position. Landing on GO this way pays the GO bonus.
    MoveTo(usize),
    /// Move a signed number of tiles, wrapping around the board.
    MoveBy(i64),
    /// Receive (positive) or pay (negative) money.
    Money(i64),
    GoToJail,
    JailFreeCard,
}

/// A card: its printed text and its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub text: &'static str,
    pub effect: CardEffect,
}

pub const CHANCE_CARDS: [Card; 6] = [
    Card { text: "Advance to GO. Collect 200.", effect: CardEffect::MoveTo(0) },
    Card { text: "Go directly to Jail.", effect: CardEffect::GoToJail },
    Card { text: "Bank error in your favor. Collect 200.", effect: CardEffect::Money(200) },
    Card { text: "Doctor's fees. Pay 50.", effect: CardEffect::Money(-50) },
    Card { text: "You won a crossword competition. Collect 100.", effect: CardEffect::Money(100) },
    Card { text: "Speeding fine. Pay 150.", effect: CardEffect::Money(-150) },
];

pub const COMMUNITY_CHEST_CARDS: [Card; 5] = [
    Card { text: "You inherit 100.", effect: CardEffect::Money(100) },
    Card { text: "Pay hospital fees of 100.", effect: CardEffect::Money(-100) },
    Card { text: "Get Out of Jail Free.", effect: CardEffect::JailFreeCard },
    Card { text: "Go back 3 spaces.", effect: CardEffect::MoveBy(-3) },
    Card { text: "Advance to GO. Collect 200.", effect: CardEffect::MoveTo(0) },
];

/// The observable result of applying a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardResult {
    MovedTo { position: usize, collected: i64 },
    MovedBy { steps: i64, position: usize },
    Money { amount: i64 },
    SentToJail { position: usize },
    JailFreeCard { held: u32 },
}

/// Draws a card from `deck`, with replacement.
pub fn draw(deck: DeckKind, rng: &mut dyn Randomness) -> &'static Card {
    let cards = deck.cards();
    let card = &cards[rng.pick(cards.len()) % cards.len()];
    debug!(deck = deck.name(), card = card.text, "card drawn");
    card
}

/// Applies `card` to `player`. Moving by card never resolves the
/// destination tile.
pub fn apply(card: &Card, player: &mut Player, board: &Board, go_bonus: i64) -> CardResult {
    match card.effect {
        CardEffect::MoveTo(target) => {
            let position = target % board.len();
            player.position = position;
            let collected = if board.tile(position) == Tile::Named(TileKind::Go) {
                player.adjust_money(go_bonus);
                go_bonus
            } else {
                0
            };
            CardResult::MovedTo { position, collected }
        }
        CardEffect::MoveBy(steps) => {
            player.move_by(steps, board.len());
            CardResult::MovedBy {
                steps,
                position: player.position,
            }
        }
        CardEffect::Money(amount) => {
            player.adjust_money(amount);
            CardResult::Money { amount }
        }
        CardEffect::GoToJail => {
            player.go_to_jail(board.jail_position());
            CardResult::SentToJail {
                position: player.position,
            }
        }
        CardEffect::JailFreeCard => {
            player.jail_free_cards += 1;
            CardResult::JailFreeCard {
                held: player.jail_free_cards,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlayerId;
    use crate::dice::ScriptedRandomness;

    fn card(effect: CardEffect) -> Card {
        Card { text: "test", effect }
    }

    #[test]
    fn draw_uses_pick_index() {
        let mut rng = ScriptedRandomness::new().with_picks([1, 1, 4]);
        assert_eq!(draw(DeckKind::Chance, &mut rng).effect, CardEffect::GoToJail);
        assert_eq!(draw(DeckKind::CommunityChest, &mut rng).effect, CardEffect::Money(-100));
        assert_eq!(draw(DeckKind::CommunityChest, &mut rng).effect, CardEffect::MoveTo(0));
    }

    #[test]
    fn advance_to_go_pays_bonus() {
        let board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 1000);
        p.position = 6;
        let result = apply(&card(CardEffect::MoveTo(0)), &mut p, &board, 200);
        assert_eq!(result, CardResult::MovedTo { position: 0, collected: 200 });
        assert_eq!(p.money, 1200);
    }

    #[test]
    fn move_to_other_tile_pays_nothing() {
        let board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 1000);
        let result = apply(&card(CardEffect::MoveTo(5)), &mut p, &board, 200);
        assert_eq!(result, CardResult::MovedTo { position: 5, collected: 0 });
        assert_eq!(p.money, 1000);
    }

    #[test]
    fn go_back_wraps_without_bonus() {
        let board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 1000);
        p.position = 2;
        apply(&card(CardEffect::MoveBy(-3)), &mut p, &board, 200);
        assert_eq!(p.position, 16);
        assert_eq!(p.money, 1000);
    }

    #[test]
    fn jail_and_jail_card() {
        let board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 1000);
        p.doubles_count = 2;
        apply(&card(CardEffect::GoToJail), &mut p, &board, 200);
        assert!(p.in_jail);
        assert_eq!(p.position, 9);
        assert_eq!(p.doubles_count, 0);

        let result = apply(&card(CardEffect::JailFreeCard), &mut p, &board, 200);
        assert_eq!(result, CardResult::JailFreeCard { held: 1 });
    }

    #[test]
    fn money_card_can_go_negative() {
        let board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 20);
        apply(&card(CardEffect::Money(-150)), &mut p, &board, 200);
        assert_eq!(p.money, -130);
    }
}
