//! Engine tuning: cooldowns, decay rates and starting values.

use crate::errors::{CatalogError, CatalogResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub walk_cooldown_secs: i64,
    pub duel_cooldown_secs: i64,
    pub satiety_decay_per_hour: u32,
    pub mood_decay_per_hour: u32,
    /// Probability that a walk ends in a random event rather than a wild encounter.
    pub random_event_chance: f64,
    /// Currency awarded to the winner of a duel.
    pub duel_purse: u64,
    pub starting_balance: u64,
    pub starting_mood: u32,
    pub starting_satiety: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            walk_cooldown_secs: 5 * 60,
            duel_cooldown_secs: 30 * 60,
            satiety_decay_per_hour: 3,
            mood_decay_per_hour: 2,
            random_event_chance: 0.7,
            duel_purse: 20,
            starting_balance: 50,
            starting_mood: 100,
            starting_satiety: 80,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a RON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&content, &path.display().to_string())
    }

    pub fn from_ron(content: &str, origin: &str) -> CatalogResult<Self> {
        let config: EngineConfig = ron::from_str(content).map_err(|e| CatalogError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CatalogResult<()> {
        if self.walk_cooldown_secs < 0 || self.duel_cooldown_secs < 0 {
            return Err(CatalogError::Invalid("cooldowns must not be negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.random_event_chance) {
            return Err(CatalogError::Invalid(format!(
                "random_event_chance {} is not a probability",
                self.random_event_chance
            )));
        }
        if self.starting_mood > 100 || self.starting_satiety > 100 {
            return Err(CatalogError::Invalid("starting mood/satiety exceed 100".to_string()));
        }
        Ok(())
    }

    pub fn walk_cooldown(&self) -> Duration {
        Duration::seconds(self.walk_cooldown_secs)
    }

    pub fn duel_cooldown(&self) -> Duration {
        Duration::seconds(self.duel_cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bundled_config_matches_defaults() {
        let bundled = include_str!("../data/engine.ron");
        let config = EngineConfig::from_ron(bundled, "engine.ron").expect("bundled config parses");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_ron("(duel_purse: 35)", "inline").expect("parses");
        assert_eq!(config.duel_purse, 35);
        assert_eq!(config.walk_cooldown(), Duration::minutes(5));
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let result = EngineConfig::from_ron("(random_event_chance: 1.5)", "inline");
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }
}
