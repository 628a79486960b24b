use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumCount, EnumIter};

/// The five elements. Each one overcomes exactly one other, forming a single cycle:
/// Metal > Wood > Earth > Water > Fire > Metal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount,
)]
pub enum Attribute {
    Metal,
    Wood,
    Earth,
    Water,
    Fire,
}

/// How an attack of one attribute lands on a defender of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effectiveness {
    Advantaged,
    Neutral,
    Disadvantaged,
}

impl Attribute {
    /// The attribute this one overcomes.
    pub fn overcomes(self) -> Attribute {
        use Attribute::*;

        match self {
            Metal => Wood,
            Wood => Earth,
            Earth => Water,
            Water => Fire,
            Fire => Metal,
        }
    }

    pub fn beats(self, other: Attribute) -> bool {
        self.overcomes() == other
    }

    /// Short label used in battle logs and status cards.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Metal => "金",
            Attribute::Wood => "木",
            Attribute::Earth => "土",
            Attribute::Water => "水",
            Attribute::Fire => "火",
        }
    }

    pub fn effectiveness(attacking: Attribute, defending: Attribute) -> Effectiveness {
        if attacking.beats(defending) {
            Effectiveness::Advantaged
        } else if defending.beats(attacking) {
            Effectiveness::Disadvantaged
        } else {
            Effectiveness::Neutral
        }
    }

    /// Damage multiplier for attacking vs defending attribute.
    /// Returns: 1.2 = advantaged, 1.0 = neutral, 0.8 = disadvantaged
    pub fn multiplier(attacking: Attribute, defending: Attribute) -> f64 {
        Self::effectiveness(attacking, defending).multiplier()
    }
}

impl Effectiveness {
    /// The multiplier as an integer percentage, for exact damage arithmetic.
    pub fn percent(self) -> u32 {
        match self {
            Effectiveness::Advantaged => 120,
            Effectiveness::Neutral => 100,
            Effectiveness::Disadvantaged => 80,
        }
    }

    pub fn multiplier(self) -> f64 {
        self.percent() as f64 / 100.0
    }

    /// Applies the multiplier to a damage value, flooring the result.
    pub fn apply(self, damage: u32) -> u32 {
        damage.saturating_mul(self.percent()) / 100
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
