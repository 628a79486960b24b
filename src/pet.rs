use crate::config::EngineConfig;
use chrono::{DateTime, Duration, Utc};
use schema::{Species, SpeciesData};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for mood and satiety.
pub const STAT_CAP: u32 = 100;

/// Activities are immediately available to a newly adopted pet.
const FRESH_COOLDOWN_OFFSET_HOURS: i64 = 2;

/// Composite key: one pet per owner per group. Both parts are opaque identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PetKey {
    pub owner_id: String,
    pub group_id: String,
}

impl PetKey {
    pub fn new(owner_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            group_id: group_id.into(),
        }
    }

    /// Another owner's key within the same group.
    pub fn neighbour(&self, owner_id: impl Into<String>) -> Self {
        Self::new(owner_id, self.group_id.clone())
    }
}

impl fmt::Display for PetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner_id, self.group_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    pub key: PetKey,
    pub name: String,
    pub species: Species,
    pub level: u32,
    pub experience: u64,
    pub mood: u32,
    pub satiety: u32,
    pub attack: u32,
    pub defense: u32,
    pub evolution_stage: u32,
    pub last_fed_time: DateTime<Utc>,
    pub last_walk_time: DateTime<Utc>,
    pub last_duel_time: DateTime<Utc>,
    /// When decay was last applied.
    pub last_observed_time: DateTime<Utc>,
    pub balance: u64,
}

impl PetRecord {
    /// A freshly adopted level 1 pet with the species' base stats.
    pub fn adopt(
        key: PetKey,
        name: Option<String>,
        species: &SpeciesData,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let cooled_down = now - Duration::hours(FRESH_COOLDOWN_OFFSET_HOURS);
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| species.name.clone());

        Self {
            key,
            name,
            species: species.species,
            level: 1,
            experience: 0,
            mood: config.starting_mood.min(STAT_CAP),
            satiety: config.starting_satiety.min(STAT_CAP),
            attack: species.base_stats.attack,
            defense: species.base_stats.defense,
            evolution_stage: 1,
            last_fed_time: now,
            last_walk_time: cooled_down,
            last_duel_time: cooled_down,
            last_observed_time: now,
            balance: config.starting_balance,
        }
    }

    /// Raise mood, capped at [`STAT_CAP`]. Returns the amount actually gained.
    pub fn gain_mood(&mut self, amount: u32) -> u32 {
        let before = self.mood;
        self.mood = self.mood.saturating_add(amount).min(STAT_CAP);
        self.mood - before
    }

    /// Raise satiety, capped at [`STAT_CAP`]. Returns the amount actually gained.
    pub fn gain_satiety(&mut self, amount: u32) -> u32 {
        let before = self.satiety;
        self.satiety = self.satiety.saturating_add(amount).min(STAT_CAP);
        self.satiety - before
    }

    pub fn gain_experience(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Time left before `last` is at least `cooldown` old, if any.
    pub fn cooldown_remaining(
        last: DateTime<Utc>,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        let elapsed = now - last;
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }
}
