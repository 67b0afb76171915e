//! Landing-tile resolution.

use tracing::debug;

use super::outcome::SpaceEffect;
use super::Game;
use crate::board::{PropertyId, Tile, TileKind};
use crate::cards::{self, DeckKind};

impl Game {
    /// Applies the effect of the tile under the player at `idx`.
    pub(super) fn resolve_space(&mut self, idx: usize) -> SpaceEffect {
        let position = self.players[idx].position;
        let effect = match self.board.tile(position) {
            Tile::Property(id) => self.resolve_property(idx, id),
            Tile::Named(TileKind::IncomeTax) => {
                let amount = self.rules.income_tax;
                self.players[idx].adjust_money(-amount);
                SpaceEffect::IncomeTax { amount }
            }
            Tile::Named(TileKind::Chance) => self.draw_card(idx, DeckKind::Chance),
            Tile::Named(TileKind::CommunityChest) => self.draw_card(idx, DeckKind::CommunityChest),
            Tile::Named(TileKind::Jail) => SpaceEffect::JustVisiting,
            Tile::Named(kind @ (TileKind::Go | TileKind::FreeParking)) => SpaceEffect::Landed {
                tile: kind.name().to_string(),
            },
        };
        debug!(player = %self.players[idx].name, position, effect = ?effect, "space resolved");
        effect
    }

    fn resolve_property(&mut self, idx: usize, id: PropertyId) -> SpaceEffect {
        let Some(property) = self.board.property(id) else {
            return SpaceEffect::Landed {
                tile: self.board.tile_name(self.players[idx].position).to_string(),
            };
        };
        let name = property.name.clone();

        match property.owner {
            None => SpaceEffect::Purchasable {
                property: name,
                cost: property.cost,
            },
            Some(owner) if owner == self.players[idx].id => SpaceEffect::OwnProperty { property: name },
            Some(owner) if property.mortgaged => SpaceEffect::Mortgaged {
                property: name,
                owner: self.players[owner.0].name.clone(),
            },
            Some(owner) => {
                let rent = property.rent();
                self.players[idx].adjust_money(-rent);
                self.players[owner.0].adjust_money(rent);
                SpaceEffect::PaidRent {
                    property: name,
                    rent,
                    owner: self.players[owner.0].name.clone(),
                }
            }
        }
    }

    fn draw_card(&mut self, idx: usize, deck: DeckKind) -> SpaceEffect {
        let card = cards::draw(deck, self.rng.as_mut());
        let result = cards::apply(card, &mut self.players[idx], &self.board, self.rules.go_bonus);
        SpaceEffect::Card {
            deck,
            text: card.text.to_string(),
            result,
        }
    }
}
