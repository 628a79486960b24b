//! In-memory pet store.
//!
//! All tables sit behind one mutex, so transactions are fully serialized.
//! Each transaction journals the prior value of every row it touches and
//! replays the journal backwards if the work fails.

use super::{InventoryEntry, PetStore, Tx};
use crate::errors::{PetError, PetResult, StorageError, StorageResult};
use crate::pet::{PetKey, PetRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

type ItemKey = (PetKey, String);

#[derive(Debug, Default)]
struct Tables {
    pets: BTreeMap<PetKey, PetRecord>,
    inventory: BTreeMap<ItemKey, u32>,
}

/// On-disk form of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    pets: Vec<PetRecord>,
    inventory: Vec<InventoryEntry>,
}

enum Undo {
    Pet(PetKey, Option<PetRecord>),
    Item(ItemKey, Option<u32>),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON snapshot written by [`MemoryStore::save_snapshot`].
    pub fn load_snapshot(path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Self::from_snapshot(snapshot)
    }

    /// Write every table to `path` as JSON.
    pub fn save_snapshot(&self, path: &Path) -> StorageResult<()> {
        let snapshot = {
            let tables = self.tables.lock().map_err(|_| StorageError::LockPoisoned)?;
            Snapshot {
                pets: tables.pets.values().cloned().collect(),
                inventory: tables
                    .inventory
                    .iter()
                    .map(|((key, item_name), quantity)| InventoryEntry {
                        key: key.clone(),
                        item_name: item_name.clone(),
                        quantity: *quantity,
                    })
                    .collect(),
            }
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)?;
        tracing::info!(
            path = %path.display(),
            pets = snapshot.pets.len(),
            items = snapshot.inventory.len(),
            "saved snapshot"
        );
        Ok(())
    }

    fn from_snapshot(snapshot: Snapshot) -> StorageResult<Self> {
        let mut tables = Tables::default();
        for record in snapshot.pets {
            let key = record.key.clone();
            if tables.pets.insert(key.clone(), record).is_some() {
                return Err(StorageError::Corrupted(format!("duplicate pet {}", key)));
            }
        }
        for entry in snapshot.inventory {
            if entry.quantity == 0 {
                return Err(StorageError::Corrupted(format!(
                    "zero-quantity row for 「{}」 of {}",
                    entry.item_name, entry.key
                )));
            }
            let row = (entry.key, entry.item_name);
            if tables.inventory.insert(row.clone(), entry.quantity).is_some() {
                return Err(StorageError::Corrupted(format!(
                    "duplicate inventory row 「{}」 of {}",
                    row.1, row.0
                )));
            }
        }
        Ok(Self {
            tables: Mutex::new(tables),
        })
    }

    pub fn pet_count(&self) -> StorageResult<usize> {
        let tables = self.tables.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.pets.len())
    }
}

impl PetStore for MemoryStore {
    fn transaction<T, F>(&self, work: F) -> PetResult<T>
    where
        F: FnOnce(&mut dyn Tx) -> PetResult<T>,
    {
        let mut tables = self.tables.lock().map_err(|_| StorageError::LockPoisoned)?;
        let mut tx = MemoryTx {
            tables: &mut *tables,
            journal: Vec::new(),
        };

        let result = work(&mut tx);
        if result.is_err() {
            tx.rollback();
        }
        result
    }
}

struct MemoryTx<'a> {
    tables: &'a mut Tables,
    journal: Vec<Undo>,
}

impl MemoryTx<'_> {
    fn rollback(&mut self) {
        tracing::debug!(writes = self.journal.len(), "rolling back transaction");
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Pet(key, Some(record)) => {
                    self.tables.pets.insert(key, record);
                }
                Undo::Pet(key, None) => {
                    self.tables.pets.remove(&key);
                }
                Undo::Item(row, Some(quantity)) => {
                    self.tables.inventory.insert(row, quantity);
                }
                Undo::Item(row, None) => {
                    self.tables.inventory.remove(&row);
                }
            }
        }
    }

    fn write_pet(&mut self, record: PetRecord) {
        let key = record.key.clone();
        let previous = self.tables.pets.insert(key.clone(), record);
        self.journal.push(Undo::Pet(key, previous));
    }

    fn write_item(&mut self, row: ItemKey, quantity: u32) {
        let previous = if quantity == 0 {
            self.tables.inventory.remove(&row)
        } else {
            self.tables.inventory.insert(row.clone(), quantity)
        };
        self.journal.push(Undo::Item(row, previous));
    }

    fn existing_pet(&self, key: &PetKey) -> PetResult<&PetRecord> {
        self.tables.pets.get(key).ok_or(PetError::NotFound)
    }
}

impl Tx for MemoryTx<'_> {
    fn pet(&self, key: &PetKey) -> PetResult<Option<PetRecord>> {
        Ok(self.tables.pets.get(key).cloned())
    }

    fn insert_pet(&mut self, record: PetRecord) -> PetResult<()> {
        if self.tables.pets.contains_key(&record.key) {
            return Err(PetError::AlreadyExists);
        }
        self.write_pet(record);
        Ok(())
    }

    fn put_pet(&mut self, record: PetRecord) -> PetResult<()> {
        self.existing_pet(&record.key)?;
        self.write_pet(record);
        Ok(())
    }

    fn spend(&mut self, key: &PetKey, amount: u64) -> PetResult<u64> {
        let current = self.existing_pet(key)?;
        let balance = current
            .balance
            .checked_sub(amount)
            .ok_or(PetError::InsufficientFunds {
                needed: amount,
                balance: current.balance,
            })?;
        let mut updated = current.clone();
        updated.balance = balance;
        self.write_pet(updated);
        Ok(balance)
    }

    fn credit(&mut self, key: &PetKey, amount: u64) -> PetResult<u64> {
        let mut updated = self.existing_pet(key)?.clone();
        updated.credit(amount);
        let balance = updated.balance;
        self.write_pet(updated);
        Ok(balance)
    }

    fn grant_item(&mut self, key: &PetKey, item_name: &str, quantity: u32) -> PetResult<u32> {
        let row = (key.clone(), item_name.to_string());
        let held = self.tables.inventory.get(&row).copied().unwrap_or(0);
        let total = held.checked_add(quantity).ok_or(PetError::InvalidQuantity)?;
        self.write_item(row, total);
        Ok(total)
    }

    fn take_item(&mut self, key: &PetKey, item_name: &str) -> PetResult<u32> {
        let row = (key.clone(), item_name.to_string());
        let held = match self.tables.inventory.get(&row) {
            Some(&quantity) if quantity > 0 => quantity,
            _ => return Err(PetError::NotOwned(item_name.to_string())),
        };
        let left = held - 1;
        self.write_item(row, left);
        Ok(left)
    }

    fn items(&self, key: &PetKey) -> PetResult<Vec<InventoryEntry>> {
        Ok(self
            .tables
            .inventory
            .iter()
            .filter(|((owner, _), _)| owner == key)
            .map(|((owner, item_name), quantity)| InventoryEntry {
                key: owner.clone(),
                item_name: item_name.clone(),
                quantity: *quantity,
            })
            .collect())
    }
}
