//! Time-based decay of mood and satiety.
//!
//! Decay is a pure transformation of a record snapshot. Whoever reads a pet
//! through the store is responsible for persisting the decayed record in the
//! same transaction (see [`crate::game::observe`]).

use crate::config::EngineConfig;
use crate::pet::PetRecord;
use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayReport {
    pub hours: u32,
    pub satiety_lost: u32,
    pub mood_lost: u32,
}

/// A record as seen at a point in time, with whatever decay was applied to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub record: PetRecord,
    pub decay: Option<DecayReport>,
}

impl Observation {
    /// True when the record differs from what is stored and must be written back.
    pub fn changed(&self) -> bool {
        self.decay.is_some()
    }
}

/// Whole hours since the last observation; zero if the clock went backwards.
pub fn hours_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let seconds = (now - since).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    u32::try_from(seconds / SECONDS_PER_HOUR).unwrap_or(u32::MAX)
}

/// Applies one step of decay per full hour elapsed since `last_observed_time`.
///
/// Less than one full hour is a no-op, so repeated application within the same
/// hour leaves the record untouched.
pub fn apply_decay(record: &PetRecord, now: DateTime<Utc>, config: &EngineConfig) -> Observation {
    let hours = hours_elapsed(record.last_observed_time, now);
    if hours == 0 {
        return Observation {
            record: record.clone(),
            decay: None,
        };
    }

    let mut decayed = record.clone();
    let satiety_drop = config.satiety_decay_per_hour.saturating_mul(hours);
    let mood_drop = config.mood_decay_per_hour.saturating_mul(hours);
    decayed.satiety = record.satiety.saturating_sub(satiety_drop);
    decayed.mood = record.mood.saturating_sub(mood_drop);
    decayed.last_observed_time = now;

    let report = DecayReport {
        hours,
        satiety_lost: record.satiety - decayed.satiety,
        mood_lost: record.mood - decayed.mood,
    };
    tracing::debug!(pet = %record.key, hours, ?report, "applied decay");

    Observation {
        record: decayed,
        decay: Some(report),
    }
}
