use crate::decay::Observation;
use crate::errors::{PetError, PetResult, StorageError};
use crate::game::{observe, PetGame};
use crate::pet::{PetKey, PetRecord};
use crate::progression::{self, Evolution};
use crate::render::StatusView;
use crate::rng::GameRng;
use crate::store::PetStore;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolveOutcome {
    pub record: PetRecord,
    pub evolution: Evolution,
}

impl<S: PetStore> PetGame<S> {
    /// Adopts a pet of a random species. The name defaults to the species name.
    pub fn adopt(
        &self,
        key: &PetKey,
        name: Option<String>,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> PetResult<PetRecord> {
        let record = self.store().transaction(|tx| {
            if tx.pet(key)?.is_some() {
                return Err(PetError::AlreadyExists);
            }
            let species = rng
                .pick(self.catalog().all_species(), "adopted species")
                .ok_or_else(|| StorageError::Corrupted("catalog has no species".to_string()))?;
            let record = PetRecord::adopt(key.clone(), name, species, self.config(), now);
            tx.insert_pet(record.clone())?;
            Ok(record)
        })?;

        tracing::info!(pet = %key, species = ?record.species, name = %record.name, "adopted");
        Ok(record)
    }

    /// The pet as of `now`, with decay applied and persisted.
    pub fn status(&self, key: &PetKey, now: DateTime<Utc>) -> PetResult<Observation> {
        self.settle(key, now)
    }

    /// The pet as of `now`, resolved into everything a status card displays.
    pub fn status_view(
        &self,
        key: &PetKey,
        owner_name: &str,
        now: DateTime<Utc>,
    ) -> PetResult<StatusView> {
        let observation = self.settle(key, now)?;
        let species = self.species_of(&observation.record)?;
        Ok(StatusView::new(observation.record, owner_name, species))
    }

    pub fn evolve(
        &self,
        key: &PetKey,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> PetResult<EvolveOutcome> {
        self.settle(key, now)?;
        let outcome = self.store().transaction(|tx| {
            let mut record = observe(tx, key, now, self.config())?.record;
            let species = self.species_of(&record)?;
            let evolution = progression::evolve(&mut record, species, rng)
                .map_err(PetError::EvolutionNotEligible)?;
            tx.put_pet(record.clone())?;
            Ok(EvolveOutcome { record, evolution })
        });

        match &outcome {
            Ok(done) => tracing::info!(pet = %key, stage = done.evolution.new_stage, "evolved"),
            Err(e) if e.is_user_facing() => {
                tracing::debug!(pet = %key, reason = %e, "evolution rejected")
            }
            Err(_) => {}
        }
        outcome
    }
}
