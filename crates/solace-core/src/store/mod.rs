//! Storage abstraction for Solace.
//!
//! Entries and settings live in two separate spaces:
//!
//! - [`EntryStore`] holds journal entries keyed by a store-assigned integer
//!   id. Ids are monotonic and never reused after deletion.
//! - [`SettingsStore`] is a flat, synchronous string key-value space with
//!   last-write-wins semantics.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add_entry`](EntryStore::add_entry) | Insert a new entry, returning its id |
//! | [`get_entries`](EntryStore::get_entries) | All entries, newest first |
//! | [`get_entry`](EntryStore::get_entry) | One entry by id |
//! | [`update_entry`](EntryStore::update_entry) | Replace mood/summary/content by id |
//! | [`delete_entry`](EntryStore::delete_entry) | Remove an entry by id |
//! | [`import_entries`](EntryStore::import_entries) | Bulk insert with fresh ids |

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::models::{Entry, NewEntry};

/// Outcome of a bulk import. Row failures are counted, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub completed: usize,
    pub errors: usize,
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert an entry and return the freshly assigned id.
    async fn add_entry(&self, entry: &NewEntry) -> Result<i64>;

    /// All entries in reverse insertion order.
    async fn get_entries(&self) -> Result<Vec<Entry>>;

    async fn get_entry(&self, id: i64) -> Result<Option<Entry>>;

    /// Replace the mood, summary and content of an existing entry.
    ///
    /// The creation date is never changed. Fails with
    /// [`JournalError::NotFound`](crate::JournalError::NotFound) when the id
    /// does not exist.
    async fn update_entry(&self, entry: &Entry) -> Result<()>;

    /// Remove an entry. Fails with `NotFound` when the id does not exist.
    async fn delete_entry(&self, id: i64) -> Result<()>;

    /// Insert every importable row as a new entry.
    ///
    /// Incoming `id` fields are discarded. Rows that do not describe a valid
    /// entry, and rows whose insert fails, count as errors. Rows already
    /// inserted stay inserted.
    async fn import_entries(&self, rows: &[serde_json::Value]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            let entry = match parse_import_row(row) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(row = index, error = %e, "skipping malformed import row");
                    report.errors += 1;
                    continue;
                }
            };
            match self.add_entry(&entry).await {
                Ok(_) => report.completed += 1,
                Err(e) => {
                    warn!(row = index, error = %e, "failed to import row");
                    report.errors += 1;
                }
            }
        }
        Ok(report)
    }
}

/// Strip any `id` and decode the remaining fields as a new entry.
pub fn parse_import_row(row: &serde_json::Value) -> std::result::Result<NewEntry, String> {
    let mut row = row.clone();
    match row.as_object_mut() {
        Some(obj) => {
            obj.remove("id");
        }
        None => return Err("row is not an object".to_string()),
    }
    serde_json::from_value(row).map_err(|e| e.to_string())
}

pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a setting. Durable when this returns.
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
}
