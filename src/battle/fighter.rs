use crate::pet::PetRecord;
use schema::{Attribute, SpeciesData};
use serde::{Deserialize, Serialize};

/// Satiety of a wild opponent; they are always well fed.
const WILD_SATIETY: u32 = 100;

/// Which corner a fighter stands in. The challenger always strikes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Challenger,
    Defender,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Challenger => 0,
            Side::Defender => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Challenger => Side::Defender,
            Side::Defender => Side::Challenger,
        }
    }
}

/// An immutable snapshot of everything a fight needs to know about one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub name: String,
    pub attribute: Attribute,
    pub level: u32,
    pub attack: u32,
    pub defense: u32,
    pub satiety: u32,
}

impl Fighter {
    pub fn from_record(record: &PetRecord, species: &SpeciesData) -> Self {
        Self {
            name: record.name.clone(),
            attribute: species.attribute,
            level: record.level,
            attack: record.attack,
            defense: record.defense,
            satiety: record.satiety,
        }
    }

    /// A wild opponent: species base stats plus its level, always at full satiety.
    pub fn wild(species: &SpeciesData, level: u32) -> Self {
        Self {
            name: format!("野生的{}", species.name),
            attribute: species.attribute,
            level,
            attack: species.base_stats.attack.saturating_add(level),
            defense: species.base_stats.defense.saturating_add(level),
            satiety: WILD_SATIETY,
        }
    }

    /// Starting hit points: level × 10 + satiety. A hungry pet fights with less.
    pub fn max_hp(&self) -> i64 {
        self.level as i64 * 10 + self.satiety as i64
    }
}
