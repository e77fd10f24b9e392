use crate::{StatusKind, StatusRules, DEFAULT_MAX_FLIPS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("max_flips_until_tails must be at least 1")]
    ZeroFlipCap,
    #[error("status rule for {0} is defined more than once")]
    DuplicateStatusRule(StatusKind),
    #[error("status rule for {0} is missing")]
    MissingStatusRule(StatusKind),
    #[error("card {card} has no attack #{index}")]
    NoSuchAttack { card: String, index: usize },
    #[error("card {card} has no ability #{index}")]
    NoSuchAbility { card: String, index: usize },
}

fn default_max_flips() -> u32 {
    DEFAULT_MAX_FLIPS
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cap for "flip a coin until you get tails".
    #[serde(default = "default_max_flips")]
    pub max_flips_until_tails: u32,
    /// Deal the final attack damage to the defender after effects resolve.
    #[serde(default = "default_true")]
    pub apply_damage_to_defender: bool,
    /// Confused attackers flip before attacking; tails cancels the attack.
    #[serde(default = "default_true")]
    pub confusion_check: bool,
    #[serde(default)]
    pub status: StatusRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_flips_until_tails: DEFAULT_MAX_FLIPS,
            apply_damage_to_defender: true,
            confusion_check: true,
            status: StatusRules::standard(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_flips_until_tails == 0 {
            return Err(EngineError::ZeroFlipCap);
        }
        for kind in StatusKind::ALL {
            match self.status.rules.iter().filter(|rule| rule.kind == kind).count() {
                0 => return Err(EngineError::MissingStatusRule(kind)),
                1 => {}
                _ => return Err(EngineError::DuplicateStatusRule(kind)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_broken_tables() {
        let mut config = EngineConfig::default();
        config.max_flips_until_tails = 0;
        assert_eq!(config.validate(), Err(EngineError::ZeroFlipCap));

        let mut config = EngineConfig::default();
        config.status.rules.retain(|rule| rule.kind != StatusKind::Asleep);
        assert_eq!(
            config.validate(),
            Err(EngineError::MissingStatusRule(StatusKind::Asleep))
        );

        let mut config = EngineConfig::default();
        let extra = config.status.rules[0].clone();
        config.status.rules.push(extra);
        assert_eq!(
            config.validate(),
            Err(EngineError::DuplicateStatusRule(StatusKind::Burned))
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "max_flips_until_tails": 4 }"#).expect("parse");
        assert_eq!(config.max_flips_until_tails, 4);
        assert!(config.apply_damage_to_defender);
        assert_eq!(config.status, StatusRules::standard());
    }
}
