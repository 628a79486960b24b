//! Pet Adventure Engine
//!
//! A virtual-pet engine: pets decay over real time, walk into random events
//! and wild fights, duel each other, level up and evolve, and are cared for
//! through a shop and backpack whose money and item movements are atomic.

// --- MODULE DECLARATIONS ---
pub mod activities;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod decay;
pub mod economy;
pub mod errors;
pub mod game;
pub mod pet;
pub mod progression;
pub mod render;
pub mod rng;
pub mod store;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    Attribute, BaseStats, Effectiveness, EvolutionStage, ItemCategory, ShopItem, Species,
    SpeciesData,
};

// --- From this crate's modules (`src/`) ---

// The facade and what its operations return.
pub use activities::{DuelOutcome, EvolveOutcome, RewardKind, WalkEvent, WalkOutcome};
pub use decay::{DecayReport, Observation};
pub use economy::{Feeding, Purchase};
pub use game::PetGame;

// Records, storage and static data.
pub use catalog::Catalog;
pub use config::EngineConfig;
pub use pet::{PetKey, PetRecord};
pub use rng::GameRng;
pub use store::{InventoryEntry, MemoryStore, PetStore, Tx};

// Presentation.
pub use render::{RenderedStatus, StatusRenderer, StatusView, TextStatusCard};

// Crate-specific error and result types.
pub use errors::{CatalogError, CatalogResult, PetError, PetResult, StorageError, StorageResult};
