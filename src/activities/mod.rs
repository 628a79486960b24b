//! Player activities: adoption and care, walks, and duels.
//!
//! Each activity settles decay first, then runs its own rules inside a single
//! store transaction, so it either applies completely or not at all.

pub mod care;
pub mod duel;
pub mod walk;

pub use care::EvolveOutcome;
pub use duel::DuelOutcome;
pub use walk::{RewardKind, WalkEvent, WalkOutcome};
