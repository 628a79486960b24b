//! Status presentation.
//!
//! The engine only prepares a [`StatusView`]; turning it into something a chat
//! client can show is the job of a [`StatusRenderer`]. Renderers never fail:
//! anything that goes wrong comes back as a plain-text reply.

use crate::pet::{PetRecord, STAT_CAP};
use crate::progression::exp_for_level;
use schema::{Attribute, SpeciesData};
use std::path::{Path, PathBuf};

/// Everything a status card shows, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub record: PetRecord,
    pub owner_name: String,
    pub species_name: String,
    pub stage_name: String,
    pub attribute: Attribute,
    pub exp_needed: u64,
    pub image_filename: String,
}

impl StatusView {
    pub fn new(record: PetRecord, owner_name: impl Into<String>, species: &SpeciesData) -> Self {
        Self {
            owner_name: owner_name.into(),
            species_name: species.name.clone(),
            stage_name: species.stage_name(record.evolution_stage).to_string(),
            attribute: species.attribute,
            exp_needed: exp_for_level(record.level),
            image_filename: species.image_filename(record.evolution_stage),
            record,
        }
    }

    /// Progress towards the next level in `[0, 1]`.
    pub fn exp_ratio(&self) -> f64 {
        if self.exp_needed == 0 {
            return 0.0;
        }
        (self.record.experience as f64 / self.exp_needed as f64).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedStatus {
    Text(String),
    Image(PathBuf),
}

pub trait StatusRenderer {
    fn render(&self, view: &StatusView) -> RenderedStatus;
}

/// Plain-text status card.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextStatusCard;

impl TextStatusCard {
    pub fn card(view: &StatusView) -> String {
        let pet = &view.record;
        [
            format!("{}的状态", pet.name),
            format!("主人: {}", view.owner_name),
            format!(
                "种族: {} ({}) [{}系]",
                view.stage_name, view.species_name, view.attribute
            ),
            format!("等级: Lv.{}", pet.level),
            format!("经验: {} / {}", pet.experience, view.exp_needed),
            format!("攻击: {}  防御: {}", pet.attack, pet.defense),
            format!(
                "心情: {}/{}  饱食度: {}/{}",
                pet.mood, STAT_CAP, pet.satiety, STAT_CAP
            ),
            format!("金钱: ${}", pet.balance),
        ]
        .join("\n")
    }
}

impl StatusRenderer for TextStatusCard {
    fn render(&self, view: &StatusView) -> RenderedStatus {
        RenderedStatus::Text(Self::card(view))
    }
}

/// Serves the pre-drawn species artwork from an asset directory, falling back
/// to the text card when the artwork is missing.
#[derive(Debug, Clone)]
pub struct AssetImageRenderer {
    asset_dir: PathBuf,
}

impl AssetImageRenderer {
    pub fn new(asset_dir: impl AsRef<Path>) -> Self {
        Self {
            asset_dir: asset_dir.as_ref().to_path_buf(),
        }
    }
}

impl StatusRenderer for AssetImageRenderer {
    fn render(&self, view: &StatusView) -> RenderedStatus {
        let path = self.asset_dir.join(&view.image_filename);
        if path.is_file() {
            RenderedStatus::Image(path)
        } else {
            tracing::warn!(path = %path.display(), "status artwork missing, sending text card");
            RenderedStatus::Text(TextStatusCard::card(view))
        }
    }
}
