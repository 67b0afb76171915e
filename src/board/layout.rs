//! Board layout: the fixed cyclic sequence of tiles.
//!
//! The standard layout has 17 tiles. Property metadata (cost, base rent,
//! rent tiers) for the standard board is stored in a compile-time table
//! and expanded into owned `Property` values when a board is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::property::{Property, PropertyId, RENT_TIER_COUNT};
use super::tile::{Tile, TileKind};

/// Number of tiles on the standard board.
pub const STANDARD_TILE_COUNT: usize = 17;

/// Errors that can occur while validating a board layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board has no tiles")]
    Empty,

    #[error("board must have exactly one Jail tile, found {0}")]
    JailCount(usize),

    #[error("duplicate property name: '{0}'")]
    DuplicateProperty(String),

    #[error("property '{0}' must have a positive cost")]
    InvalidCost(String),

    #[error("rent tiers for '{0}' must be non-negative and non-decreasing")]
    InvalidRentTiers(String),
}

/// Errors from loading a board layout file.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("failed to read board file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse board JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] BoardError),
}

/// A tile description used to build a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSpec {
    Property {
        name: String,
        cost: i64,
        base_rent: i64,
        rent_tiers: [i64; RENT_TIER_COUNT],
    },
    Named(TileKind),
}

enum StandardTile {
    Property(&'static str, i64, i64, [i64; RENT_TIER_COUNT]),
    Named(TileKind),
}

const STANDARD_LAYOUT: [StandardTile; STANDARD_TILE_COUNT] = [
    StandardTile::Named(TileKind::Go),
    StandardTile::Property("Renzo House", 100, 50, [10, 50, 150, 450, 625, 750]),
    StandardTile::Named(TileKind::CommunityChest),
    StandardTile::Property("Kyle Tower", 120, 50, [12, 60, 180, 500, 700, 900]),
    StandardTile::Named(TileKind::IncomeTax),
    StandardTile::Property("Crisostomo Plaza", 200, 100, [25, 100, 300, 750, 925, 1100]),
    StandardTile::Named(TileKind::Chance),
    StandardTile::Property("Macmac Pavilion", 140, 70, [14, 70, 200, 550, 750, 950]),
    StandardTile::Property("Mike House", 160, 80, [16, 80, 220, 600, 800, 1000]),
    StandardTile::Named(TileKind::Jail),
    StandardTile::Property("Leenor Estate", 200, 100, [25, 100, 300, 750, 925, 1100]),
    StandardTile::Named(TileKind::CommunityChest),
    StandardTile::Property("Malate", 100, 50, [10, 50, 150, 450, 625, 750]),
    StandardTile::Named(TileKind::IncomeTax),
    StandardTile::Property("Bagong Pook", 120, 50, [12, 60, 180, 500, 700, 900]),
    StandardTile::Named(TileKind::FreeParking),
    StandardTile::Property("Dark Tower", 200, 100, [25, 100, 300, 750, 925, 1100]),
];

/// The tile specs of the standard board.
pub fn standard_layout() -> Vec<TileSpec> {
    STANDARD_LAYOUT
        .iter()
        .map(|t| match *t {
            StandardTile::Property(name, cost, base_rent, rent_tiers) => TileSpec::Property {
                name: name.to_string(),
                cost,
                base_rent,
                rent_tiers,
            },
            StandardTile::Named(kind) => TileSpec::Named(kind),
        })
        .collect()
}

fn validate(specs: &[TileSpec]) -> Result<(), BoardError> {
    if specs.is_empty() {
        return Err(BoardError::Empty);
    }

    let mut names: Vec<&str> = Vec::new();
    let mut jails = 0;
    for spec in specs {
        match spec {
            TileSpec::Property {
                name,
                cost,
                rent_tiers,
                ..
            } => {
                if names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                    return Err(BoardError::DuplicateProperty(name.clone()));
                }
                if *cost <= 0 {
                    return Err(BoardError::InvalidCost(name.clone()));
                }
                if rent_tiers[0] < 0 || rent_tiers.windows(2).any(|w| w[0] > w[1]) {
                    return Err(BoardError::InvalidRentTiers(name.clone()));
                }
                names.push(name);
            }
            TileSpec::Named(TileKind::Jail) => jails += 1,
            TileSpec::Named(_) => {}
        }
    }

    if jails != 1 {
        return Err(BoardError::JailCount(jails));
    }
    Ok(())
}

/// An ordered, fixed-length cycle of tiles plus the properties they refer to.
///
/// The tile sequence never changes after construction; only the mutable
/// state of the properties (owner, mortgage, buildings) does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tiles: Vec<Tile>,
    properties: Vec<Property>,
    /// Board position of each property, indexed by `PropertyId`.
    property_positions: Vec<usize>,
    jail_position: usize,
}

impl Board {
    /// Builds and validates a board from tile specs.
    pub fn new(specs: &[TileSpec]) -> Result<Board, BoardError> {
        validate(specs)?;
        Ok(Self::build(specs))
    }

    /// Parses a JSON array of tile specs and builds a validated board.
    pub fn from_json_str(json: &str) -> Result<Board, LayoutError> {
        let specs: Vec<TileSpec> = serde_json::from_str(json)?;
        Ok(Board::new(&specs)?)
    }

    /// Loads a board layout from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Board, LayoutError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// The standard 17-tile board.
    pub fn standard() -> Board {
        Self::build(&standard_layout())
    }

    /// Expands specs into tiles and properties. `specs` must already be valid.
    fn build(specs: &[TileSpec]) -> Board {
        let mut tiles = Vec::with_capacity(specs.len());
        let mut properties: Vec<Property> = Vec::new();
        let mut property_positions = Vec::new();
        let mut jail_position = 0;

        for (pos, spec) in specs.iter().enumerate() {
            match spec {
                TileSpec::Property {
                    name,
                    cost,
                    base_rent,
                    rent_tiers,
                } => {
                    let id = PropertyId(properties.len());
                    properties.push(Property::new(id, name.clone(), *cost, *base_rent, *rent_tiers));
                    property_positions.push(pos);
                    tiles.push(Tile::Property(id));
                }
                TileSpec::Named(kind) => {
                    if *kind == TileKind::Jail {
                        jail_position = pos;
                    }
                    tiles.push(Tile::Named(*kind));
                }
            }
        }

        Board {
            tiles,
            properties,
            property_positions,
            jail_position,
        }
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The tile at `position`, wrapping around the board.
    pub fn tile(&self, position: usize) -> Tile {
        self.tiles[position % self.tiles.len()]
    }

    /// Display name of the tile at `position`.
    pub fn tile_name(&self, position: usize) -> &str {
        match self.tile(position) {
            Tile::Property(id) => &self.properties[id.0].name,
            Tile::Named(kind) => kind.name(),
        }
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(id.0)
    }

    pub fn property_mut(&mut self, id: PropertyId) -> Option<&mut Property> {
        self.properties.get_mut(id.0)
    }

    /// Looks up a property by name, ignoring ASCII case and surrounding whitespace.
    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        let name = name.trim();
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The property at `position`, if that tile is a property.
    pub fn property_at(&self, position: usize) -> Option<&Property> {
        self.tile(position).property().and_then(|id| self.property(id))
    }

    /// Board position of a property.
    pub fn position_of_property(&self, id: PropertyId) -> Option<usize> {
        self.property_positions.get(id.0).copied()
    }

    /// Position of the single Jail tile.
    pub fn jail_position(&self) -> usize {
        self.jail_position
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_shape() {
        let board = Board::standard();
        assert_eq!(board.len(), STANDARD_TILE_COUNT);
        assert_eq!(board.properties().len(), 9);
        assert_eq!(board.jail_position(), 9);
        assert_eq!(board.tile(0), Tile::Named(TileKind::Go));
        assert_eq!(board.tile_name(1), "Renzo House");
        assert_eq!(board.tile_name(STANDARD_TILE_COUNT + 1), "Renzo House");
        assert_eq!(board.tile(15), Tile::Named(TileKind::FreeParking));
    }

    #[test]
    fn standard_matches_validated_layout() {
        let built = Board::new(&standard_layout()).unwrap();
        assert_eq!(built, Board::standard());
    }

    #[test]
    fn lookup_by_name_and_position() {
        let board = Board::standard();
        let malate = board.property_by_name("  malate ").unwrap();
        assert_eq!(malate.cost, 100);
        assert_eq!(board.position_of_property(malate.id), Some(12));
        assert_eq!(board.property_at(12).map(|p| p.id), Some(malate.id));
        assert!(board.property_at(9).is_none());
        assert!(board.property_by_name("Boardwalk").is_none());
    }

    #[test]
    fn rejects_missing_or_extra_jail() {
        let mut specs = standard_layout();
        specs[9] = TileSpec::Named(TileKind::FreeParking);
        assert_eq!(Board::new(&specs), Err(BoardError::JailCount(0)));

        let mut specs = standard_layout();
        specs[15] = TileSpec::Named(TileKind::Jail);
        assert_eq!(Board::new(&specs), Err(BoardError::JailCount(2)));
    }

    #[test]
    fn rejects_bad_properties() {
        assert_eq!(Board::new(&[]), Err(BoardError::Empty));

        let mut specs = standard_layout();
        specs[3] = specs[1].clone();
        assert_eq!(
            Board::new(&specs),
            Err(BoardError::DuplicateProperty("Renzo House".to_string()))
        );

        let mut specs = standard_layout();
        specs[1] = TileSpec::Property {
            name: "Shack".to_string(),
            cost: 0,
            base_rent: 1,
            rent_tiers: [1; RENT_TIER_COUNT],
        };
        assert_eq!(Board::new(&specs), Err(BoardError::InvalidCost("Shack".to_string())));

        specs[1] = TileSpec::Property {
            name: "Shack".to_string(),
            cost: 10,
            base_rent: 1,
            rent_tiers: [5, 4, 6, 7, 8, 9],
        };
        assert_eq!(
            Board::new(&specs),
            Err(BoardError::InvalidRentTiers("Shack".to_string()))
        );
    }

    #[test]
    fn layout_from_json() {
        let json = r#"[{"named":"Go"},{"property":{"name":"Hut","cost":60,"base_rent":2,"rent_tiers":[2,10,30,90,160,250]}},{"named":"Jail"}]"#;
        let board = Board::from_json_str(json).unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board.jail_position(), 2);
        assert_eq!(board.property_by_name("hut").unwrap().rent(), 2);

        assert!(matches!(
            Board::from_json_str(r#"[{"named":"Go"}]"#),
            Err(LayoutError::Invalid(BoardError::JailCount(0)))
        ));
        assert!(matches!(Board::from_json_str("[{"), Err(LayoutError::Json(_))));
        assert!(matches!(
            Board::load("/nonexistent/landlord-board.json"),
            Err(LayoutError::Io(_))
        ));
    }
}
