//! In-memory stores for testing and WASM targets.
//!
//! Entries live in a `BTreeMap` keyed by id behind `std::sync::RwLock`;
//! every operation holds the lock for its whole duration, so writes to the
//! same id are serialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{JournalError, Result};
use crate::models::{Entry, NewEntry};

use super::{EntryStore, SettingsStore};

struct Entries {
    rows: BTreeMap<i64, NewEntry>,
    last_id: i64,
}

/// In-memory entry store.
pub struct InMemoryStore {
    entries: RwLock<Entries>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> JournalError {
    JournalError::Storage("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn add_entry(&self, entry: &NewEntry) -> Result<i64> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.last_id += 1;
        let id = entries.last_id;
        entries.rows.insert(id, entry.clone());
        Ok(id)
    }

    async fn get_entries(&self) -> Result<Vec<Entry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .rows
            .iter()
            .rev()
            .map(|(id, e)| e.clone().with_id(*id))
            .collect())
    }

    async fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.rows.get(&id).map(|e| e.clone().with_id(id)))
    }

    async fn update_entry(&self, entry: &Entry) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let stored = entries
            .rows
            .get_mut(&entry.id)
            .ok_or(JournalError::NotFound(entry.id))?;
        stored.mood = entry.mood.clone();
        stored.body = entry.body.clone();
        Ok(())
    }

    async fn delete_entry(&self, id: i64) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(JournalError::NotFound(id))
    }
}

/// In-memory settings.
#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
