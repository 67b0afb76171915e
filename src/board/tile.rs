//! Tile kinds for the board.
//!
//! A board position holds either a purchasable property or one of a small
//! closed set of named tiles. Dispatch on landing is done on the variant,
//! never on the tile's display name.

use serde::{Deserialize, Serialize};

use super::property::PropertyId;

/// A named, non-purchasable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Go,
    Jail,
    Chance,
    CommunityChest,
    IncomeTax,
    FreeParking,
}

impl TileKind {
    /// Returns the display name printed on the board.
    pub const fn name(self) -> &'static str {
        match self {
            TileKind::Go => "GO",
            TileKind::Jail => "Jail",
            TileKind::Chance => "Chance",
            TileKind::CommunityChest => "Community Chest",
            TileKind::IncomeTax => "Income Tax",
            TileKind::FreeParking => "Free Parking",
        }
    }
}

/// A single board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Property(PropertyId),
    Named(TileKind),
}

impl Tile {
    /// Returns the property id if this tile is a property.
    pub fn property(self) -> Option<PropertyId> {
        match self {
            Tile::Property(id) => Some(id),
            Tile::Named(_) => None,
        }
    }
}
