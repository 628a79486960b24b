//! The game facade: catalog, tuning and storage composed behind one handle.
//!
//! Every public operation lives in the module that owns its rules
//! (`activities`, `economy`) as an `impl<S: PetStore> PetGame<S>` block.

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::decay::{apply_decay, Observation};
use crate::errors::{PetError, PetResult, StorageError};
use crate::pet::{PetKey, PetRecord};
use crate::store::{PetStore, Tx};
use chrono::{DateTime, Utc};
use schema::SpeciesData;
use std::sync::Arc;

pub struct PetGame<S: PetStore> {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    store: S,
}

impl<S: PetStore> PetGame<S> {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig, store: S) -> Self {
        Self {
            catalog,
            config,
            store,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commits decay for `key` on its own, before the activity transaction runs.
    ///
    /// Decay is part of reading a pet, not of the activity, so a rejected
    /// activity must not discard it.
    pub(crate) fn settle(&self, key: &PetKey, now: DateTime<Utc>) -> PetResult<Observation> {
        self.store.transaction(|tx| observe(tx, key, now, &self.config))
    }

    pub(crate) fn species_of(&self, record: &PetRecord) -> PetResult<&SpeciesData> {
        species_of(&self.catalog, record)
    }
}

/// Looks up the species of a stored record. A record whose species is missing
/// from the catalog means the store and the data files disagree.
pub(crate) fn species_of<'a>(
    catalog: &'a Catalog,
    record: &PetRecord,
) -> PetResult<&'a SpeciesData> {
    catalog.species(record.species).ok_or_else(|| {
        PetError::Storage(StorageError::Corrupted(format!(
            "pet {} has species {:?} which is not in the catalog",
            record.key, record.species
        )))
    })
}

/// Reads a pet, applies decay and writes the decayed record back in the same
/// transaction. `NotFound` if the owner has no pet in this group.
pub(crate) fn observe(
    tx: &mut dyn Tx,
    key: &PetKey,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> PetResult<Observation> {
    let record = tx.pet(key)?.ok_or(PetError::NotFound)?;
    let observation = apply_decay(&record, now, config);
    if observation.changed() {
        tx.put_pet(observation.record.clone())?;
    }
    Ok(observation)
}
