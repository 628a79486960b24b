use crate::Attribute;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

/// Every species a pet can belong to. Display names and stats live in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
    EnumCount,
)]
pub enum Species {
    WaterSprite,
    FirePup,
    LeafyCat,
    CataclasticRock,
    KingKong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
}

/// One step of a species' growth chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub name: String,
    /// Level required to leave this stage. `None` marks the final form.
    pub evolve_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub species: Species,
    pub name: String,
    pub attribute: Attribute,
    pub description: String,
    pub base_stats: BaseStats,
    /// Ordered growth chain; stage numbers are 1-based indices into it.
    pub evolutions: Vec<EvolutionStage>,
    /// File stem of the artwork, e.g. "FirePup" for "FirePup_1.png".
    pub asset_stem: String,
}

impl SpeciesData {
    pub fn stage(&self, stage: u32) -> Option<&EvolutionStage> {
        let index = stage.checked_sub(1)? as usize;
        self.evolutions.get(index)
    }

    pub fn final_stage(&self) -> u32 {
        self.evolutions.len() as u32
    }

    /// Display name at the given stage, falling back to the species name.
    pub fn stage_name(&self, stage: u32) -> &str {
        self.stage(stage)
            .map(|s| s.name.as_str())
            .unwrap_or(self.name.as_str())
    }

    pub fn image_filename(&self, stage: u32) -> String {
        format!("{}_{}.png", self.asset_stem, stage)
    }
}
