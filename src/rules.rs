//! House rules: money amounts and optional jail variant.
//!
//! Rules are fixed when a game starts. They can be loaded from a JSON file,
//! where missing fields take their defaults, or set one at a time through
//! the protocol's `setoption` command.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Upper bound accepted for any money amount in the rules.
pub const MAX_MONEY: i64 = 1_000_000_000;

/// Errors from loading or updating rules.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Tunable money amounts and variant switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Cash each player starts with.
    pub starting_money: i64,
    /// Flat amount charged on an Income Tax tile.
    pub income_tax: i64,
    /// Paid when a card moves a player onto GO.
    pub go_bonus: i64,
    /// Price of leaving jail early.
    pub jail_fine: i64,
    /// If set, a player who fails this many doubles attempts in jail pays
    /// the fine and moves by the last roll. If unset, a jailed player waits
    /// for doubles, a card, or a paid fine.
    pub max_jail_turns: Option<u32>,
    /// Seed for dice and card draws. Entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            starting_money: 1500,
            income_tax: 200,
            go_bonus: 200,
            jail_fine: 50,
            max_jail_turns: None,
            seed: None,
        }
    }
}

impl Rules {
    /// Parses rules from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Rules, RulesError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Loads rules from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Rules, RulesError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Sets one rule by its protocol option name. A missing value or
    /// `none` clears the optional rules.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), RulesError> {
        let invalid = || RulesError::InvalidValue {
            name: name.to_string(),
            value: value.unwrap_or("").to_string(),
        };
        let parse_money = || -> Result<i64, RulesError> {
            value
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| (0..=MAX_MONEY).contains(v))
                .ok_or_else(invalid)
        };
        let clearing = matches!(value, None | Some("none"));

        match name.to_ascii_lowercase().as_str() {
            "startingmoney" => self.starting_money = parse_money()?,
            "incometax" => self.income_tax = parse_money()?,
            "gobonus" => self.go_bonus = parse_money()?,
            "jailfine" => self.jail_fine = parse_money()?,
            "maxjailturns" => {
                self.max_jail_turns = if clearing {
                    None
                } else {
                    let turns = value
                        .and_then(|v| v.parse::<u32>().ok())
                        .filter(|v| *v > 0)
                        .ok_or_else(invalid)?;
                    Some(turns)
                };
            }
            "seed" => {
                self.seed = if clearing {
                    None
                } else {
                    Some(value.and_then(|v| v.parse::<u64>().ok()).ok_or_else(invalid)?)
                };
            }
            _ => return Err(RulesError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Checks that money amounts lie in `0..=MAX_MONEY` and that a jail
    /// limit, if set, is at least one.
    pub fn validate(&self) -> Result<(), RulesError> {
        let amounts = [
            ("starting_money", self.starting_money),
            ("income_tax", self.income_tax),
            ("go_bonus", self.go_bonus),
            ("jail_fine", self.jail_fine),
        ];
        for (name, value) in amounts {
            if !(0..=MAX_MONEY).contains(&value) {
                return Err(RulesError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if self.max_jail_turns == Some(0) {
            return Err(RulesError::InvalidValue {
                name: "max_jail_turns".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let rules = Rules::default();
        assert_eq!(rules.starting_money, 1500);
        assert_eq!(rules.income_tax, 200);
        assert_eq!(rules.go_bonus, 200);
        assert_eq!(rules.max_jail_turns, None);
    }

    #[test]
    fn json_fills_missing_fields() {
        let rules = Rules::from_json_str(r#"{"starting_money": 500, "max_jail_turns": 3}"#).unwrap();
        assert_eq!(rules.starting_money, 500);
        assert_eq!(rules.max_jail_turns, Some(3));
        assert_eq!(rules.income_tax, 200);
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(Rules::from_json_str("{"), Err(RulesError::Json(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            Rules::load("/nonexistent/landlord-rules.json"),
            Err(RulesError::Io(_))
        ));
    }

    #[test]
    fn set_option_by_name() {
        let mut rules = Rules::default();
        rules.set_option("StartingMoney", Some("2000")).unwrap();
        rules.set_option("incometax", Some("100")).unwrap();
        rules.set_option("MaxJailTurns", Some("3")).unwrap();
        rules.set_option("Seed", Some("42")).unwrap();
        assert_eq!(rules.starting_money, 2000);
        assert_eq!(rules.income_tax, 100);
        assert_eq!(rules.max_jail_turns, Some(3));
        assert_eq!(rules.seed, Some(42));

        rules.set_option("MaxJailTurns", Some("none")).unwrap();
        rules.set_option("Seed", None).unwrap();
        assert_eq!(rules.max_jail_turns, None);
        assert_eq!(rules.seed, None);
    }

    #[test]
    fn set_option_errors() {
        let mut rules = Rules::default();
        assert!(matches!(
            rules.set_option("Threads", Some("4")),
            Err(RulesError::UnknownOption(_))
        ));
        assert!(matches!(
            rules.set_option("GoBonus", Some("-5")),
            Err(RulesError::InvalidValue { .. })
        ));
        assert!(matches!(
            rules.set_option("JailFine", None),
            Err(RulesError::InvalidValue { .. })
        ));
        assert_eq!(rules, Rules::default());
    }

    #[test]
    fn money_options_are_capped() {
        let mut rules = Rules::default();
        assert!(matches!(
            rules.set_option("StartingMoney", Some("9223372036854775807")),
            Err(RulesError::InvalidValue { .. })
        ));
        assert!(matches!(
            rules.set_option("GoBonus", Some("1000000001")),
            Err(RulesError::InvalidValue { .. })
        ));
        rules.set_option("GoBonus", Some("1000000000")).unwrap();
        assert_eq!(rules.go_bonus, MAX_MONEY);
        assert_eq!(rules.starting_money, 1500);
    }

    #[test]
    fn json_values_are_validated() {
        assert!(matches!(
            Rules::from_json_str(r#"{"starting_money": 9223372036854775807}"#),
            Err(RulesError::InvalidValue { .. })
        ));
        assert!(matches!(
            Rules::from_json_str(r#"{"jail_fine": -1}"#),
            Err(RulesError::InvalidValue { .. })
        ));
        assert!(matches!(
            Rules::from_json_str(r#"{"max_jail_turns": 0}"#),
            Err(RulesError::InvalidValue { .. })
        ));
    }
}
