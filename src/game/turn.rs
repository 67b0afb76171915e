//! Turn resolution.
//!
//! One call to `roll_turn` runs the full sequence for the current player:
//!
//! 1. Roll two dice.
//! 2. In jail: doubles release and move; otherwise count a failed attempt
//!    and end the turn (or, when `max_jail_turns` is set and reached, pay
//!    the fine and move).
//! 3. Free: doubles extend the streak and the third consecutive doubles
//!    goes straight to jail without resolving a tile; non-doubles reset
//!    the streak. Then move.
//! 4. Resolve the landed tile.
//! 5. Check for a winner.
//! 6. Pass the turn to the next player who is not bankrupt.

use tracing::debug;

use super::outcome::{JailEvent, SpaceEffect, TurnOutcome};
use super::{Game, GameError};
use crate::board::DOUBLES_LIMIT;
use crate::dice::DiceRoll;

impl Game {
    /// Rolls for the current player and resolves the whole turn.
    pub fn roll_turn(&mut self) -> Result<TurnOutcome, GameError> {
        let idx = self.active_index()?;
        let dice = self.rng.roll();
        debug!(player = %self.players[idx].name, dice = %dice, "dice rolled");

        let jail = if self.players[idx].in_jail {
            match self.roll_in_jail(idx, dice) {
                Some(event @ JailEvent::StillInJail { .. }) => {
                    return Ok(self.finish_turn(idx, dice, Some(event), None));
                }
                event => event,
            }
        } else {
            let player = &mut self.players[idx];
            if dice.is_doubles() {
                player.doubles_count += 1;
                if player.doubles_count >= DOUBLES_LIMIT {
                    let jail_position = self.board.jail_position();
                    self.players[idx].go_to_jail(jail_position);
                    let event = Some(JailEvent::SentForDoubles);
                    return Ok(self.finish_turn(idx, dice, event, None));
                }
            } else {
                player.doubles_count = 0;
            }
            None
        };

        let steps = i64::from(dice.total());
        self.players[idx].move_by(steps, self.board.len());
        let space = self.resolve_space(idx);
        Ok(self.finish_turn(idx, dice, jail, Some(space)))
    }

    /// Handles a roll made from jail. Returns `StillInJail` if the player
    /// stays put; any other event means the player is free to move.
    fn roll_in_jail(&mut self, idx: usize, dice: DiceRoll) -> Option<JailEvent> {
        let player = &mut self.players[idx];
        if dice.is_doubles() {
            player.release_from_jail();
            return Some(JailEvent::ReleasedOnDoubles);
        }

        player.jail_turns += 1;
        let attempts = player.jail_turns;
        match self.rules.max_jail_turns {
            Some(limit) if attempts >= limit => {
                let fine = self.rules.jail_fine;
                player.adjust_money(-fine);
                player.release_from_jail();
                Some(JailEvent::ReleasedAfterFine { fine, attempts })
            }
            _ => Some(JailEvent::StillInJail { attempts }),
        }
    }

    /// Checks for a winner, passes the turn on, and assembles the outcome.
    fn finish_turn(
        &mut self,
        idx: usize,
        dice: DiceRoll,
        jail: Option<JailEvent>,
        space: Option<SpaceEffect>,
    ) -> TurnOutcome {
        let game_over = self.check_game_end();
        let player = &self.players[idx];
        let position = player.position;

        let action = match (&jail, &space) {
            (Some(j), Some(s)) => format!("{} {}", j.describe(&player.name), s.describe(&player.name)),
            (Some(j), None) => j.describe(&player.name),
            (None, Some(s)) => s.describe(&player.name),
            (None, None) => format!("{} rolled {}", player.name, dice),
        };
        let card = match &space {
            Some(SpaceEffect::Card { text, .. }) => Some(text.clone()),
            _ => None,
        };

        let outcome = TurnOutcome {
            player: player.name.clone(),
            dice,
            new_position: position,
            tile: self.board.tile_name(position).to_string(),
            jail,
            space,
            card,
            action,
            game_over,
        };
        self.advance_turn();
        outcome
    }
}
