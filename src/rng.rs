//! Injectable randomness.
//!
//! Every random quantity in the engine is derived from a single unit draw in
//! `[0, 1)`, so a fight or a reward roll can be replayed from a seed, or from a
//! hand-written list of draws in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

enum Source {
    Seeded(StdRng),
    #[cfg(test)]
    Scripted { outcomes: Vec<f64>, index: usize },
}

pub struct GameRng {
    source: Source,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            source: Source::Seeded(StdRng::from_os_rng()),
        }
    }

    /// Replays the given unit draws in order. Panics when they run out.
    #[cfg(test)]
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: Source::Scripted { outcomes, index: 0 },
        }
    }

    fn next_unit(&mut self, reason: &str) -> f64 {
        let unit = match &mut self.source {
            Source::Seeded(rng) => rng.random::<f64>(),
            #[cfg(test)]
            Source::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "GameRng exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                outcome
            }
        };
        tracing::trace!(unit, reason, "rng draw");
        unit.clamp(0.0, 1.0 - f64::EPSILON)
    }

    /// Uniform integer in `low..=high`.
    pub fn int_inclusive(&mut self, low: i64, high: i64, reason: &str) -> i64 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.next_unit(reason) * span).floor() as i64;
        (low + offset).min(high)
    }

    /// Uniform unsigned integer in `low..=high`.
    pub fn roll(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        self.int_inclusive(low as i64, high as i64, reason) as u32
    }

    /// Uniform real in `[low, high)`.
    pub fn factor(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        low + self.next_unit(reason) * (high - low)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64, reason: &str) -> bool {
        self.next_unit(reason) < p
    }

    /// Uniformly chooses one element, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T], reason: &str) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.int_inclusive(0, items.len() as i64 - 1, reason) as usize;
        items.get(index)
    }
}
