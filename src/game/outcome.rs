//! Structured results of engine operations and read-only snapshots.
//!
//! Everything here serializes with serde so adapters can emit it directly.

use serde::Serialize;

use crate::board::{Board, Player};
use crate::cards::{CardResult, DeckKind};
use crate::dice::DiceRoll;

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GameOver {
    Winner { name: String },
    /// Every player went bankrupt.
    Draw,
}

/// What happened with respect to jail during a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JailEvent {
    StillInJail { attempts: u32 },
    ReleasedOnDoubles,
    ReleasedAfterFine { fine: i64, attempts: u32 },
    SentForDoubles,
}

impl JailEvent {
    pub fn describe(&self, player: &str) -> String {
        match self {
            JailEvent::StillInJail { attempts } => {
                format!("{} is still in jail (Turn {})", player, attempts)
            }
            JailEvent::ReleasedOnDoubles => {
                format!("{} rolled doubles and got out of jail!", player)
            }
            JailEvent::ReleasedAfterFine { fine, attempts } => format!(
                "{} paid {} and left jail after {} attempts.",
                player, fine, attempts
            ),
            JailEvent::SentForDoubles => format!(
                "{} rolled doubles three times and is sent to jail!",
                player
            ),
        }
    }
}

/// The effect of the tile a player landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpaceEffect {
    Purchasable { property: String, cost: i64 },
    PaidRent { property: String, rent: i64, owner: String },
    OwnProperty { property: String },
    Mortgaged { property: String, owner: String },
    IncomeTax { amount: i64 },
    Card { deck: DeckKind, text: String, result: CardResult },
    JustVisiting,
    Landed { tile: String },
}

impl SpaceEffect {
    pub fn describe(&self, player: &str) -> String {
        match self {
            SpaceEffect::Purchasable { property, cost } => {
                format!("Unowned property: {} (Cost: {})", property, cost)
            }
            SpaceEffect::PaidRent { rent, owner, .. } => {
                format!("Paid rent of {} to {}", rent, owner)
            }
            SpaceEffect::OwnProperty { property } => format!("{} owns {}", player, property),
            SpaceEffect::Mortgaged { property, .. } => {
                format!("{} is mortgaged; no rent due", property)
            }
            SpaceEffect::IncomeTax { amount } => {
                format!("{} paid {} in taxes.", player, amount)
            }
            SpaceEffect::Card { deck, text, .. } => format!("{}: {}", deck.name(), text),
            SpaceEffect::JustVisiting => format!("{} is just visiting jail", player),
            SpaceEffect::Landed { tile } => format!("Landed on {}", tile),
        }
    }
}

/// Result of one `roll_turn` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub player: String,
    pub dice: DiceRoll,
    pub new_position: usize,
    pub tile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jail: Option<JailEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<SpaceEffect>,
    /// Text of the card drawn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    /// Human-readable summary of the turn.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_over: Option<GameOver>,
}

/// Result of a non-roll action (buy, build, trade, bankruptcy, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub player: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_over: Option<GameOver>,
}

/// Read-only view of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub money: i64,
    pub position: usize,
    pub properties: Vec<String>,
    pub bankrupt: bool,
    pub in_jail: bool,
    pub jail_free_cards: u32,
    pub houses: u32,
    pub hotels: u32,
}

impl PlayerSnapshot {
    pub fn new(player: &Player, board: &Board) -> Self {
        let owned: Vec<_> = player
            .properties
            .iter()
            .filter_map(|id| board.property(*id))
            .collect();
        PlayerSnapshot {
            name: player.name.clone(),
            money: player.money,
            position: player.position,
            properties: owned.iter().map(|p| p.name.clone()).collect(),
            bankrupt: player.bankrupt,
            in_jail: player.in_jail,
            jail_free_cards: player.jail_free_cards,
            houses: owned.iter().map(|p| u32::from(p.houses)).sum(),
            hotels: owned.iter().filter(|p| p.hotel).count() as u32,
        }
    }
}

/// Read-only view of the whole game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub current_player: Option<String>,
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameOver>,
}

/// Read-only view of one property tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySnapshot {
    pub position: usize,
    pub name: String,
    pub cost: i64,
    pub rent: i64,
    pub owner: Option<String>,
    pub mortgaged: bool,
    pub houses: u8,
    pub hotel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlayerId;

    #[test]
    fn snapshot_aggregates_buildings() {
        let mut board = Board::standard();
        let mut p = Player::new(PlayerId(0), "ana", 5000);
        for name in ["Renzo House", "Malate"] {
            let id = board.property_by_name(name).unwrap().id;
            board.property_mut(id).unwrap().buy(&mut p).unwrap();
            for _ in 0..4 {
                board.property_mut(id).unwrap().build_house(&mut p).unwrap();
            }
        }
        let malate = board.property_by_name("Malate").unwrap().id;
        board.property_mut(malate).unwrap().build_hotel(&mut p).unwrap();

        let snap = PlayerSnapshot::new(&p, &board);
        assert_eq!(snap.properties, vec!["Renzo House".to_string(), "Malate".to_string()]);
        assert_eq!(snap.houses, 4);
        assert_eq!(snap.hotels, 1);
    }

    #[test]
    fn narratives() {
        assert_eq!(
            SpaceEffect::PaidRent {
                property: "Malate".into(),
                rent: 10,
                owner: "ben".into()
            }
            .describe("ana"),
            "Paid rent of 10 to ben"
        );
        assert_eq!(
            JailEvent::StillInJail { attempts: 2 }.describe("ana"),
            "ana is still in jail (Turn 2)"
        );
    }

    #[test]
    fn game_over_json_shape() {
        let json = serde_json::to_string(&GameOver::Winner { name: "ana".into() }).unwrap();
        assert_eq!(json, r#"{"result":"winner","name":"ana"}"#);
        let json = serde_json::to_string(&GameOver::Draw).unwrap();
        assert_eq!(json, r#"{"result":"draw"}"#);
    }
}
