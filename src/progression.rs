//! Experience curve, level-ups and evolution.

use crate::errors::EvolutionBlock;
use crate::pet::PetRecord;
use crate::rng::GameRng;
use schema::SpeciesData;
use std::fmt;

// Stat growth per level gained, inclusive ranges.
const LEVEL_UP_GAIN: (u32, u32) = (1, 2);
// Stat growth on evolution, inclusive ranges.
const EVOLUTION_GAIN: (u32, u32) = (8, 15);

/// Experience needed to advance from `level` to the next one: floor(10 × level^1.5).
pub fn exp_for_level(level: u32) -> u64 {
    // 10 × l^1.5 = sqrt(100 × l^3), computed exactly in integers.
    let level = level as u128;
    isqrt(100 * level * level * level).min(u64::MAX as u128) as u64
}

fn isqrt(value: u128) -> u128 {
    let mut root = (value as f64).sqrt() as u128;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    root
}

/// One level gained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub pet_name: String,
    pub new_level: u32,
    pub attack_gain: u32,
    pub defense_gain: u32,
}

impl fmt::Display for LevelUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🎉 恭喜！你的宠物「{}」升级到了 Lv.{}！(攻击 +{}，防御 +{})",
            self.pet_name, self.new_level, self.attack_gain, self.defense_gain
        )
    }
}

/// Consumes experience one threshold at a time, raising level and stats for each.
///
/// Returns one entry per level gained, in ascending order. Leftover experience
/// carries over.
pub fn check_level_up(record: &mut PetRecord, rng: &mut GameRng) -> Vec<LevelUp> {
    let mut gained = Vec::new();

    loop {
        let needed = exp_for_level(record.level);
        if record.experience < needed {
            break;
        }

        record.experience -= needed;
        record.level += 1;
        let attack_gain = rng.roll(LEVEL_UP_GAIN.0, LEVEL_UP_GAIN.1, "level-up attack");
        let defense_gain = rng.roll(LEVEL_UP_GAIN.0, LEVEL_UP_GAIN.1, "level-up defense");
        record.attack = record.attack.saturating_add(attack_gain);
        record.defense = record.defense.saturating_add(defense_gain);

        tracing::info!(pet = %record.key, level = record.level, "level up");
        gained.push(LevelUp {
            pet_name: record.name.clone(),
            new_level: record.level,
            attack_gain,
            defense_gain,
        });
    }

    gained
}

/// Result of a successful evolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evolution {
    pub pet_name: String,
    pub new_stage: u32,
    pub stage_name: String,
    pub attack_gain: u32,
    pub defense_gain: u32,
}

impl fmt::Display for Evolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "光芒四射！你的「{}」成功进化为了「{}」！(攻击 +{}，防御 +{})",
            self.pet_name, self.stage_name, self.attack_gain, self.defense_gain
        )
    }
}

/// Checks whether the record may leave its current stage.
pub fn evolution_block(record: &PetRecord, species: &SpeciesData) -> Option<EvolutionBlock> {
    let current = match species.stage(record.evolution_stage) {
        Some(stage) => stage,
        None => return Some(EvolutionBlock::AlreadyFinalForm),
    };
    match current.evolve_level {
        None => Some(EvolutionBlock::AlreadyFinalForm),
        Some(required) if record.level < required => {
            Some(EvolutionBlock::LevelTooLow { required })
        }
        Some(_) if species.stage(record.evolution_stage + 1).is_none() => {
            Some(EvolutionBlock::AlreadyFinalForm)
        }
        Some(_) => None,
    }
}

/// Advances the record one stage along its species chain.
///
/// Species, level and experience are untouched; only stage, attack and defense change.
pub fn evolve(
    record: &mut PetRecord,
    species: &SpeciesData,
    rng: &mut GameRng,
) -> Result<Evolution, EvolutionBlock> {
    if let Some(block) = evolution_block(record, species) {
        return Err(block);
    }

    record.evolution_stage += 1;
    let attack_gain = rng.roll(EVOLUTION_GAIN.0, EVOLUTION_GAIN.1, "evolution attack");
    let defense_gain = rng.roll(EVOLUTION_GAIN.0, EVOLUTION_GAIN.1, "evolution defense");
    record.attack = record.attack.saturating_add(attack_gain);
    record.defense = record.defense.saturating_add(defense_gain);

    Ok(Evolution {
        pet_name: record.name.clone(),
        new_stage: record.evolution_stage,
        stage_name: species.stage_name(record.evolution_stage).to_string(),
        attack_gain,
        defense_gain,
    })
}
