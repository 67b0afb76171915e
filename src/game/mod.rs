//! The game engine.
//!
//! `Game` owns the board, the players in turn order and the randomness
//! source. Rolling drives the turn state machine in `turn`; every other
//! action (buying, building, mortgaging, trading, bankruptcy, leaving jail)
//! is a direct, synchronous state transition on the current player that
//! either applies completely or returns an error and changes nothing.
//!
//! Bankruptcy is never forced by the engine. Rent, tax and cards may leave
//! a player with negative money; the player (or the driving adapter) must
//! raise funds or declare bankruptcy explicitly.

pub mod error;
pub mod outcome;
mod space;
mod turn;

use std::collections::HashSet;

use tracing::info;

use crate::board::{transfer_ownership, Board, Player, PlayerId, Property, PropertyId, Rejection};
use crate::dice::{Randomness, SeededRandomness};
use crate::rules::Rules;

pub use error::{ErrorKind, GameError};
pub use outcome::{
    ActionReport, GameOver, GameSnapshot, JailEvent, PlayerSnapshot, PropertySnapshot,
    SpaceEffect, TurnOutcome,
};

/// Signature shared by the property mutators.
type PropertyAction = fn(&mut Property, &mut Player) -> Result<(), Rejection>;

/// A single match.
pub struct Game {
    rules: Rules,
    /// Pristine copy of the board, restored on start and reset.
    layout: Board,
    board: Board,
    players: Vec<Player>,
    turn_index: usize,
    result: Option<GameOver>,
    rng: Box<dyn Randomness>,
}

impl Game {
    /// Creates an empty game on the standard board.
    pub fn new(rules: Rules) -> Self {
        Self::with_board(rules, Board::standard())
    }

    /// Creates an empty game on a custom board.
    pub fn with_board(rules: Rules, board: Board) -> Self {
        let rng = Box::new(SeededRandomness::new(rules.seed));
        Game {
            rules,
            layout: board.clone(),
            board,
            players: Vec::new(),
            turn_index: 0,
            result: None,
            rng,
        }
    }

    /// Replaces the dice and card source.
    pub fn with_randomness(mut self, rng: impl Randomness + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replaces the dice and card source in place.
    pub fn set_randomness(&mut self, rng: impl Randomness + 'static) {
        self.rng = Box::new(rng);
    }

    /// Replaces the rules. Tax, GO bonus, jail fine and the jail limit take
    /// effect on the next roll; starting money only on the next `start`.
    pub fn set_rules(&mut self, rules: Rules) {
        self.rules = rules;
    }

    /// Starts a new match with `names` in turn order. All previous player
    /// and property state is discarded. Names must be non-empty and unique.
    pub fn start<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<String>, GameError> {
        let mut seen = HashSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(GameError::InvalidPlayerName(name.to_string()));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(GameError::DuplicatePlayer(name.to_string()));
            }
        }

        self.clear();
        self.players = names
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(PlayerId(i), name.as_ref().trim(), self.rules.starting_money))
            .collect();
        let roster: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        info!(players = ?roster, "game started");
        Ok(roster)
    }

    /// Drops every player and restores the board.
    pub fn reset(&mut self) {
        self.clear();
        info!("game reset");
    }

    fn clear(&mut self) {
        self.board = self.layout.clone();
        self.players.clear();
        self.turn_index = 0;
        self.result = None;
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.find_player(name).map(|i| &self.players[i])
    }

    /// The player whose turn it is, if there are players.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn is_ended(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&GameOver> {
        self.result.as_ref()
    }

    /// Read-only snapshot of every player plus the end state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot::new(p, &self.board))
                .collect(),
            current_player: self.current_player().map(|p| p.name.clone()),
            ended: self.is_ended(),
            result: self.result.clone(),
        }
    }

    /// Every property on the board with its ownership and development.
    pub fn property_listing(&self) -> Vec<PropertySnapshot> {
        self.board
            .properties()
            .iter()
            .map(|p| PropertySnapshot {
                position: self.board.position_of_property(p.id).unwrap_or_default(),
                name: p.name.clone(),
                cost: p.cost,
                rent: p.rent(),
                owner: p.owner.and_then(|o| self.players.get(o.0)).map(|o| o.name.clone()),
                mortgaged: p.mortgaged,
                houses: p.houses,
                hotel: p.hotel,
            })
            .collect()
    }

    /// Buys the property the current player is standing on.
    pub fn buy_current_space(&mut self) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        let position = self.players[idx].position;
        let id = self
            .board
            .tile(position)
            .property()
            .ok_or(Rejection::NotPurchasable)?;
        let property = self
            .board
            .property_mut(id)
            .ok_or(Rejection::NotPurchasable)?;
        property.buy(&mut self.players[idx])?;
        let message = format!("{} bought {}", self.players[idx].name, property.name);
        Ok(self.report(idx, message))
    }

    pub fn build_house(&mut self, property: &str) -> Result<ActionReport, GameError> {
        self.act_on_property(property, Property::build_house, "built a house on")
    }

    pub fn build_hotel(&mut self, property: &str) -> Result<ActionReport, GameError> {
        self.act_on_property(property, Property::build_hotel, "built a hotel on")
    }

    pub fn mortgage(&mut self, property: &str) -> Result<ActionReport, GameError> {
        self.act_on_property(property, Property::mortgage, "mortgaged")
    }

    pub fn unmortgage(&mut self, property: &str) -> Result<ActionReport, GameError> {
        self.act_on_property(property, Property::unmortgage, "unmortgaged")
    }

    fn act_on_property(
        &mut self,
        name: &str,
        action: PropertyAction,
        verb: &str,
    ) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        let id = self.property_id(name)?;
        let property = self
            .board
            .property_mut(id)
            .ok_or_else(|| GameError::UnknownProperty(name.to_string()))?;
        action(property, &mut self.players[idx])?;
        let message = format!("{} {} {}", self.players[idx].name, verb, property.name);
        Ok(self.report(idx, message))
    }

    /// Trades `property` from `from` to `to` in exchange for `money` paid
    /// by `to` to `from`.
    ///
    /// Both players must exist, differ, and still be in the game. All
    /// checks run before anything moves, so the money and the property
    /// change hands together or not at all. `property` may be omitted for
    /// a plain cash transfer.
    pub fn trade(
        &mut self,
        from: &str,
        to: &str,
        money: i64,
        property: Option<&str>,
    ) -> Result<ActionReport, GameError> {
        self.require_playable()?;
        let from_idx = self
            .find_player(from)
            .ok_or_else(|| GameError::UnknownPlayer(from.to_string()))?;
        let to_idx = self
            .find_player(to)
            .ok_or_else(|| GameError::UnknownPlayer(to.to_string()))?;
        if from_idx == to_idx {
            return Err(GameError::SelfTrade(from.to_string()));
        }
        if self.players[from_idx].bankrupt || self.players[to_idx].bankrupt {
            return Err(Rejection::Bankrupt.into());
        }
        if money < 0 {
            return Err(Rejection::NegativeAmount.into());
        }
        if self.players[to_idx].money < money {
            return Err(Rejection::InsufficientFunds {
                needed: money,
                available: self.players[to_idx].money,
            }
            .into());
        }
        let property_id = match property {
            Some(name) => {
                let id = self.property_id(name)?;
                let owned = self
                    .board
                    .property(id)
                    .is_some_and(|p| p.is_owned_by(PlayerId(from_idx)));
                if !owned {
                    return Err(Rejection::NotOwner.into());
                }
                Some(id)
            }
            None => None,
        };

        let (giver, receiver) = pair_mut(&mut self.players, from_idx, to_idx);
        receiver.adjust_money(-money);
        giver.adjust_money(money);
        let mut message = format!("{} traded with {}", giver.name, receiver.name);
        if let Some(prop) = property_id.and_then(|id| self.board.property_mut(id)) {
            transfer_ownership(prop, Some(&mut *giver), Some(&mut *receiver));
            message = format!(
                "{} gave {} to {} for {}",
                giver.name, prop.name, receiver.name, money
            );
        }
        info!(from = %giver.name, to = %receiver.name, money, property = ?property, "trade completed");
        Ok(self.report(from_idx, message))
    }

    /// Declares the current player bankrupt. Their properties return to
    /// the bank, the win condition is checked, and play passes on.
    pub fn declare_bankruptcy(&mut self) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        self.bankrupt_player(idx);
        let message = format!("{} is bankrupt", self.players[idx].name);
        Ok(self.report(idx, message))
    }

    /// Same effect as `declare_bankruptcy`, reported as a forfeit.
    pub fn forfeit(&mut self) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        self.bankrupt_player(idx);
        let message = format!("{} forfeited the game", self.players[idx].name);
        Ok(self.report(idx, message))
    }

    fn bankrupt_player(&mut self, idx: usize) {
        self.players[idx].declare_bankruptcy(&mut self.board);
        if self.check_game_end().is_none() {
            self.advance_turn();
        }
    }

    /// Spends a get-out-of-jail-free card.
    pub fn use_jail_free_card(&mut self) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        let player = &mut self.players[idx];
        if !player.in_jail {
            return Err(Rejection::NotInJail.into());
        }
        if player.jail_free_cards == 0 {
            return Err(Rejection::NoJailFreeCard.into());
        }
        player.jail_free_cards -= 1;
        player.release_from_jail();
        let message = format!("{} used a Get Out of Jail Free card", player.name);
        Ok(self.report(idx, message))
    }

    /// Pays the jail fine to leave jail before rolling.
    pub fn pay_jail_fine(&mut self) -> Result<ActionReport, GameError> {
        let idx = self.active_index()?;
        let fine = self.rules.jail_fine;
        let player = &mut self.players[idx];
        if !player.in_jail {
            return Err(Rejection::NotInJail.into());
        }
        if player.money < fine {
            return Err(Rejection::InsufficientFunds {
                needed: fine,
                available: player.money,
            }
            .into());
        }
        player.adjust_money(-fine);
        player.release_from_jail();
        let message = format!("{} paid {} to leave jail", player.name, fine);
        Ok(self.report(idx, message))
    }

    /// Ends the game once at most one solvent player remains.
    ///
    /// One survivor wins. Zero survivors is a draw.
    fn check_game_end(&mut self) -> Option<GameOver> {
        if self.result.is_some() || self.players.is_empty() {
            return self.result.clone();
        }
        let mut solvent = self.players.iter().filter(|p| !p.bankrupt);
        let result = match (solvent.next(), solvent.next()) {
            (Some(winner), None) => GameOver::Winner {
                name: winner.name.clone(),
            },
            (None, _) => GameOver::Draw,
            _ => return None,
        };
        info!(result = ?result, "game over");
        self.result = Some(result.clone());
        Some(result)
    }

    /// Moves to the next player who is not bankrupt. Stops after one full
    /// lap when everyone is bankrupt.
    fn advance_turn(&mut self) {
        let n = self.players.len();
        if n == 0 {
            return;
        }
        for _ in 0..n {
            self.turn_index = (self.turn_index + 1) % n;
            if !self.players[self.turn_index].bankrupt {
                return;
            }
        }
    }

    /// Errors unless the game has players and has not ended.
    fn require_playable(&self) -> Result<(), GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if self.result.is_some() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    /// Index of the current player, provided they may act.
    fn active_index(&self) -> Result<usize, GameError> {
        self.require_playable()?;
        if self.players[self.turn_index].bankrupt {
            return Err(Rejection::Bankrupt.into());
        }
        Ok(self.turn_index)
    }

    fn find_player(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.players
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn property_id(&self, name: &str) -> Result<PropertyId, GameError> {
        self.board
            .property_by_name(name)
            .map(|p| p.id)
            .ok_or_else(|| GameError::UnknownProperty(name.to_string()))
    }

    fn report(&self, idx: usize, message: String) -> ActionReport {
        ActionReport {
            player: self.players[idx].name.clone(),
            message,
            game_over: self.result.clone(),
        }
    }
}

/// Borrows two distinct players mutably.
fn pair_mut(players: &mut [Player], a: usize, b: usize) -> (&mut Player, &mut Player) {
    if a < b {
        let (left, right) = players.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = players.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRandomness;

    fn game(names: &[&str]) -> Game {
        let mut game = Game::new(Rules::default()).with_randomness(ScriptedRandomness::new());
        game.start(names).unwrap();
        game
    }

    fn place(game: &mut Game, idx: usize, position: usize) {
        game.players[idx].position = position;
    }

    #[test]
    fn start_validates_names() {
        let mut game = Game::new(Rules::default());
        assert_eq!(
            game.start(&["ana", "ANA"]),
            Err(GameError::DuplicatePlayer("ANA".to_string()))
        );
        assert_eq!(game.start(&["ana", " "]), Err(GameError::InvalidPlayerName(String::new())));
        assert!(game.players().is_empty());
        assert_eq!(game.start(&["ana", "ben"]).unwrap(), vec!["ana", "ben"]);
        assert_eq!(game.players()[1].money, 1500);
    }

    #[test]
    fn start_discards_previous_state() {
        let mut game = game(&["ana", "ben"]);
        place(&mut game, 0, 1);
        game.buy_current_space().unwrap();
        game.start(&["cat", "dan"]).unwrap();
        assert!(game.board().properties().iter().all(|p| p.owner.is_none()));
        assert_eq!(game.current_player().unwrap().name, "cat");
    }

    #[test]
    fn empty_game_is_unavailable() {
        let mut game = Game::new(Rules::default());
        assert_eq!(game.roll_turn().unwrap_err(), GameError::NoPlayers);
        assert_eq!(game.buy_current_space().unwrap_err(), GameError::NoPlayers);
        assert_eq!(game.declare_bankruptcy().unwrap_err(), GameError::NoPlayers);
        assert_eq!(game.snapshot().players.len(), 0);
    }

    #[test]
    fn buy_on_non_property_is_rejected() {
        let mut game = game(&["ana", "ben"]);
        assert_eq!(
            game.buy_current_space().unwrap_err(),
            GameError::Rejected(Rejection::NotPurchasable)
        );
    }

    #[test]
    fn build_on_unknown_and_unowned_property() {
        let mut game = game(&["ana", "ben"]);
        assert_eq!(
            game.build_house("Boardwalk").unwrap_err(),
            GameError::UnknownProperty("Boardwalk".to_string())
        );
        assert_eq!(
            game.build_house("Malate").unwrap_err(),
            GameError::Rejected(Rejection::NotOwner)
        );
    }

    #[test]
    fn develop_and_mortgage_through_engine() {
        let mut game = game(&["ana", "ben"]);
        place(&mut game, 0, 12);
        game.buy_current_space().unwrap();
        let report = game.build_house("malate").unwrap();
        assert_eq!(report.message, "ana built a house on Malate");
        assert_eq!(game.players()[0].money, 1500 - 100 - 50);
        game.mortgage("Malate").unwrap();
        assert_eq!(
            game.build_house("Malate").unwrap_err(),
            GameError::Rejected(Rejection::Mortgaged)
        );
        game.unmortgage("Malate").unwrap();
        assert_eq!(game.players()[0].money, 1500 - 100 - 50 + 50 - 60);
    }

    #[test]
    fn trade_moves_money_and_property_together() {
        let mut game = game(&["ana", "ben"]);
        place(&mut game, 0, 5);
        game.buy_current_space().unwrap();

        game.trade("ana", "ben", 300, Some("Crisostomo Plaza")).unwrap();
        let ana = game.player("ana").unwrap();
        let ben = game.player("ben").unwrap();
        assert_eq!(ana.money, 1500 - 200 + 300);
        assert_eq!(ben.money, 1200);
        assert!(ana.properties.is_empty());
        assert_eq!(ben.properties.len(), 1);
        let plaza = game.board().property_by_name("Crisostomo Plaza").unwrap();
        assert_eq!(plaza.owner, Some(ben.id));
    }

    #[test]
    fn failed_trade_changes_nothing() {
        let mut game = game(&["ana", "ben"]);
        place(&mut game, 0, 5);
        game.buy_current_space().unwrap();
        let before = game.snapshot();

        assert_eq!(
            game.trade("ana", "ana", 10, None).unwrap_err(),
            GameError::SelfTrade("ana".to_string())
        );
        assert_eq!(
            game.trade("ana", "zed", 10, None).unwrap_err(),
            GameError::UnknownPlayer("zed".to_string())
        );
        assert_eq!(
            game.trade("ben", "ana", 10, Some("Crisostomo Plaza")).unwrap_err(),
            GameError::Rejected(Rejection::NotOwner)
        );
        assert_eq!(
            game.trade("ana", "ben", 5000, Some("Crisostomo Plaza")).unwrap_err(),
            GameError::Rejected(Rejection::InsufficientFunds { needed: 5000, available: 1500 })
        );
        assert_eq!(
            game.trade("ana", "ben", -1, None).unwrap_err(),
            GameError::Rejected(Rejection::NegativeAmount)
        );
        assert_eq!(
            game.trade("ana", "ben", 10, Some("Nowhere")).unwrap_err(),
            GameError::UnknownProperty("Nowhere".to_string())
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn bankruptcy_passes_turn_and_ends_game() {
        let mut game = game(&["ana", "ben", "cat"]);
        place(&mut game, 0, 1);
        game.buy_current_space().unwrap();

        let report = game.declare_bankruptcy().unwrap();
        assert_eq!(report.game_over, None);
        assert_eq!(game.current_player().unwrap().name, "ben");
        assert!(game.board().property_by_name("Renzo House").unwrap().owner.is_none());

        let report = game.forfeit().unwrap();
        assert_eq!(report.message, "ben forfeited the game");
        assert_eq!(report.game_over, Some(GameOver::Winner { name: "cat".into() }));
        assert!(game.is_ended());
        assert_eq!(game.roll_turn().unwrap_err(), GameError::GameOver);
    }

    #[test]
    fn jail_exits() {
        let mut game = game(&["ana", "ben"]);
        assert_eq!(
            game.use_jail_free_card().unwrap_err(),
            GameError::Rejected(Rejection::NotInJail)
        );
        let jail = game.board().jail_position();
        game.players[0].go_to_jail(jail);
        assert_eq!(
            game.use_jail_free_card().unwrap_err(),
            GameError::Rejected(Rejection::NoJailFreeCard)
        );
        game.players[0].jail_free_cards = 1;
        game.use_jail_free_card().unwrap();
        assert!(!game.players()[0].in_jail);
        assert_eq!(game.players()[0].jail_free_cards, 0);

        game.players[0].go_to_jail(jail);
        game.pay_jail_fine().unwrap();
        assert!(!game.players()[0].in_jail);
        assert_eq!(game.players()[0].money, 1450);
    }

    #[test]
    fn property_listing_reports_owner() {
        let mut game = game(&["ana", "ben"]);
        place(&mut game, 0, 3);
        game.buy_current_space().unwrap();
        let listing = game.property_listing();
        assert_eq!(listing.len(), 9);
        let kyle = listing.iter().find(|p| p.name == "Kyle Tower").unwrap();
        assert_eq!(kyle.position, 3);
        assert_eq!(kyle.owner.as_deref(), Some("ana"));
        assert_eq!(kyle.rent, 12);
    }

    #[test]
    fn set_rules_applies_amounts_from_next_roll() {
        let mut game = Game::new(Rules::default())
            .with_randomness(ScriptedRandomness::new().with_rolls([(1, 3)]));
        game.start(&["ana", "ben"]).unwrap();
        game.set_rules(Rules {
            income_tax: 10,
            starting_money: 99,
            ..Rules::default()
        });

        let outcome = game.roll_turn().unwrap();
        assert_eq!(outcome.space, Some(SpaceEffect::IncomeTax { amount: 10 }));
        assert_eq!(game.players[0].money, 1490);
        assert_eq!(game.players[1].money, 1500);

        game.start(&["ana"]).unwrap();
        assert_eq!(game.players[0].money, 99);
    }

    #[test]
    fn reset_clears_players() {
        let mut game = game(&["ana", "ben"]);
        game.reset();
        assert!(game.players().is_empty());
        assert!(!game.is_ended());
        assert_eq!(game.roll_turn().unwrap_err(), GameError::NoPlayers);
    }
}
