//! Persistence contracts for pet and inventory records.
//!
//! Two logical tables: `pets` keyed by (owner, group) and `inventory` keyed by
//! (owner, group, item). Every activity runs as one [`PetStore::transaction`]:
//! either all of its writes land or none do.

mod memory;

pub use memory::MemoryStore;

use crate::errors::PetResult;
use crate::pet::{PetKey, PetRecord};
use serde::{Deserialize, Serialize};

/// One row of the inventory table. Rows never hold a zero quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub key: PetKey,
    pub item_name: String,
    pub quantity: u32,
}

/// Store capable of running short serializable transactions.
pub trait PetStore: Send + Sync {
    /// Runs `work` against a transaction handle.
    ///
    /// Writes become visible only if `work` returns `Ok`; on `Err` every write
    /// made through the handle is discarded.
    fn transaction<T, F>(&self, work: F) -> PetResult<T>
    where
        F: FnOnce(&mut dyn Tx) -> PetResult<T>;
}

/// Operations available inside a transaction.
///
/// The conditional mutations (`spend`, `take_item`) compare and modify in one
/// step: they either apply fully or reject without touching anything.
pub trait Tx {
    fn pet(&self, key: &PetKey) -> PetResult<Option<PetRecord>>;

    /// Inserts a new pet. Fails with `AlreadyExists` if the key is taken.
    fn insert_pet(&mut self, record: PetRecord) -> PetResult<()>;

    /// Overwrites an existing pet. Fails with `NotFound` if there is none.
    fn put_pet(&mut self, record: PetRecord) -> PetResult<()>;

    /// Deducts `amount` only if the balance covers it. Returns the new balance.
    fn spend(&mut self, key: &PetKey, amount: u64) -> PetResult<u64>;

    /// Adds `amount` to the balance. Returns the new balance.
    fn credit(&mut self, key: &PetKey, amount: u64) -> PetResult<u64>;

    /// Upserts an inventory row by `quantity`. Returns the new quantity, or
    /// `InvalidQuantity` if the held count would overflow.
    fn grant_item(&mut self, key: &PetKey, item_name: &str, quantity: u32) -> PetResult<u32>;

    /// Removes one unit if any are held, deleting the row at zero. Returns what is left.
    fn take_item(&mut self, key: &PetKey, item_name: &str) -> PetResult<u32>;

    /// All inventory rows of one owner, ordered by item name.
    fn items(&self, key: &PetKey) -> PetResult<Vec<InventoryEntry>>;
}
