pub mod engine;
pub mod events;
pub mod fighter;

pub use engine::{resolve, BattleOutcome};
pub use events::BattleEvent;
pub use fighter::{Fighter, Side};
