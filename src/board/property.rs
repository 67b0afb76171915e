//! Purchasable properties and the property economy.
//!
//! A property carries six rent tiers indexed by development level: tiers
//! 0..=4 apply to zero through four houses, tier 5 applies once a hotel is
//! built. Every mutator checks its preconditions up front and leaves both
//! the property and the player untouched when one fails.

use serde::Serialize;
use tracing::info;

use super::player::{Player, PlayerId};

/// Number of rent tiers: bare, one to four houses, hotel.
pub const RENT_TIER_COUNT: usize = 6;

/// Maximum number of houses before a hotel can be built.
pub const MAX_HOUSES: u8 = 4;

/// House price as a percentage of the purchase cost.
pub const HOUSE_COST_PERCENT: i64 = 50;

/// Hotel price as a percentage of the purchase cost.
pub const HOTEL_COST_PERCENT: i64 = 75;

/// Unmortgage fee as a percentage of the purchase cost (principal plus 10%).
pub const UNMORTGAGE_PERCENT: i64 = 60;

/// Index of a property in the board's property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropertyId(pub usize);

/// A business-rule failure. The state is left unchanged whenever one of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("property is already owned")]
    AlreadyOwned,

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("player does not own this property")]
    NotOwner,

    #[error("property is mortgaged")]
    Mortgaged,

    #[error("property is not mortgaged")]
    NotMortgaged,

    #[error("property already has the maximum number of houses")]
    HouseLimit,

    #[error("a hotel requires four houses")]
    HotelRequiresFourHouses,

    #[error("property already has a hotel")]
    HotelBuilt,

    #[error("the current space cannot be bought")]
    NotPurchasable,

    #[error("player is not in jail")]
    NotInJail,

    #[error("player has no get-out-of-jail-free card")]
    NoJailFreeCard,

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("player is bankrupt")]
    Bankrupt,
}

/// A purchasable, developable board asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub cost: i64,
    /// Printed base rent. Informational only; charged rent comes from `rent_tiers`.
    pub base_rent: i64,
    pub rent_tiers: [i64; RENT_TIER_COUNT],
    pub owner: Option<PlayerId>,
    pub mortgaged: bool,
    pub houses: u8,
    pub hotel: bool,
}

impl Property {
    /// Creates an unowned, undeveloped property.
    pub fn new(
        id: PropertyId,
        name: impl Into<String>,
        cost: i64,
        base_rent: i64,
        rent_tiers: [i64; RENT_TIER_COUNT],
    ) -> Self {
        Property {
            id,
            name: name.into(),
            cost,
            base_rent,
            rent_tiers,
            owner: None,
            mortgaged: false,
            houses: 0,
            hotel: false,
        }
    }

    /// Rent currently owed by a visitor. Zero while mortgaged.
    pub fn rent(&self) -> i64 {
        if self.mortgaged {
            return 0;
        }
        if self.hotel {
            return self.rent_tiers[RENT_TIER_COUNT - 1];
        }
        self.rent_tiers[self.houses as usize]
    }

    /// Price of one house.
    pub fn house_cost(&self) -> i64 {
        self.cost * HOUSE_COST_PERCENT / 100
    }

    /// Price of the hotel.
    pub fn hotel_cost(&self) -> i64 {
        self.cost * HOTEL_COST_PERCENT / 100
    }

    /// Credit paid out when mortgaging.
    pub fn mortgage_value(&self) -> i64 {
        self.cost / 2
    }

    /// Fee to lift the mortgage.
    pub fn unmortgage_fee(&self) -> i64 {
        self.cost * UNMORTGAGE_PERCENT / 100
    }

    /// Returns true if `player` is the owner.
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// Buys the property for `buyer` at its listed cost.
    pub fn buy(&mut self, buyer: &mut Player) -> Result<(), Rejection> {
        if self.owner.is_some() {
            return Err(Rejection::AlreadyOwned);
        }
        if buyer.bankrupt {
            return Err(Rejection::Bankrupt);
        }
        require_funds(buyer, self.cost)?;

        buyer.adjust_money(-self.cost);
        transfer_ownership(self, None, Some(&mut *buyer));
        info!(player = %buyer.name, property = %self.name, cost = self.cost, "property bought");
        Ok(())
    }

    /// Adds one house.
    pub fn build_house(&mut self, player: &mut Player) -> Result<(), Rejection> {
        self.require_developable(player)?;
        if self.houses >= MAX_HOUSES {
            return Err(Rejection::HouseLimit);
        }
        let fee = self.house_cost();
        require_funds(player, fee)?;

        player.adjust_money(-fee);
        self.houses += 1;
        info!(player = %player.name, property = %self.name, houses = self.houses, "house built");
        Ok(())
    }

    /// Replaces four houses with a hotel.
    pub fn build_hotel(&mut self, player: &mut Player) -> Result<(), Rejection> {
        self.require_developable(player)?;
        if self.houses != MAX_HOUSES {
            return Err(Rejection::HotelRequiresFourHouses);
        }
        let fee = self.hotel_cost();
        require_funds(player, fee)?;

        player.adjust_money(-fee);
        self.hotel = true;
        self.houses = 0;
        info!(player = %player.name, property = %self.name, "hotel built");
        Ok(())
    }

    /// Mortgages the property, crediting half its cost to the owner.
    pub fn mortgage(&mut self, player: &mut Player) -> Result<(), Rejection> {
        if !self.is_owned_by(player.id) {
            return Err(Rejection::NotOwner);
        }
        if self.mortgaged {
            return Err(Rejection::Mortgaged);
        }

        self.mortgaged = true;
        player.adjust_money(self.mortgage_value());
        info!(player = %player.name, property = %self.name, credit = self.mortgage_value(), "property mortgaged");
        Ok(())
    }

    /// Lifts the mortgage for 60% of the cost.
    pub fn unmortgage(&mut self, player: &mut Player) -> Result<(), Rejection> {
        if !self.is_owned_by(player.id) {
            return Err(Rejection::NotOwner);
        }
        if !self.mortgaged {
            return Err(Rejection::NotMortgaged);
        }
        let fee = self.unmortgage_fee();
        require_funds(player, fee)?;

        player.adjust_money(-fee);
        self.mortgaged = false;
        info!(player = %player.name, property = %self.name, fee, "property unmortgaged");
        Ok(())
    }

    fn require_developable(&self, player: &Player) -> Result<(), Rejection> {
        if !self.is_owned_by(player.id) {
            return Err(Rejection::NotOwner);
        }
        if self.mortgaged {
            return Err(Rejection::Mortgaged);
        }
        if self.hotel {
            return Err(Rejection::HotelBuilt);
        }
        Ok(())
    }
}

fn require_funds(player: &Player, needed: i64) -> Result<(), Rejection> {
    if player.money < needed {
        return Err(Rejection::InsufficientFunds {
            needed,
            available: player.money,
        });
    }
    Ok(())
}

/// Moves `property` from `from` to `to`, keeping both sides of the
/// ownership relation in step.
///
/// This is the only place ownership changes. Passing `None` for `from`
/// takes the property from the bank; passing `None` for `to` returns it to
/// the bank, which also clears any mortgage and buildings so an unowned
/// property is always plain.
pub fn transfer_ownership(
    property: &mut Property,
    from: Option<&mut Player>,
    to: Option<&mut Player>,
) {
    if let Some(prev) = from {
        prev.properties.remove(&property.id);
    }
    match to {
        Some(next) => {
            next.properties.insert(property.id);
            property.owner = Some(next.id);
        }
        None => {
            property.owner = None;
            property.mortgaged = false;
            property.houses = 0;
            property.hotel = false;
        }
    }
}
