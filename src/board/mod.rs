//! Board representation and participant state.
//!
//! Contains the tile layout, the property economy, and players, together
//! with the single ownership-transfer operation that keeps the
//! property/player relation consistent.

pub mod layout;
pub mod player;
pub mod property;
pub mod tile;

pub use layout::{standard_layout, Board, BoardError, LayoutError, TileSpec, STANDARD_TILE_COUNT};
pub use player::{Player, PlayerId, DOUBLES_LIMIT};
pub use property::{transfer_ownership, Property, PropertyId, Rejection, MAX_HOUSES, RENT_TIER_COUNT};
pub use tile::{Tile, TileKind};
