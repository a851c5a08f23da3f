//! SQLite-backed [`EntryStore`] implementation.
//!
//! The pool is opened lazily on first use. A failed open is logged and
//! retried once within the same call; if both attempts fail the call returns
//! [`JournalError::Storage`] and the next call starts over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use solace_core::error::{JournalError, Result};
use solace_core::models::{format_timestamp, Entry, EntryBody, NewEntry, Turn};
use solace_core::store::EntryStore;

use crate::{db, migrate};

const INIT_ATTEMPTS: usize = 2;

/// SQLite implementation of the [`EntryStore`] trait.
///
/// Rows map one to one onto entries: transcripts keep their turns as JSON
/// in `content_json`, reflections leave it `NULL`.
pub struct SqliteStore {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                let mut last_err = None;
                for attempt in 1..=INIT_ATTEMPTS {
                    match self.open().await {
                        Ok(pool) => {
                            debug!(path = %self.path.display(), "journal database opened");
                            return Ok(pool);
                        }
                        Err(e) => {
                            warn!(attempt, error = %e, "failed to open journal database");
                            last_err = Some(e);
                        }
                    }
                }
                let message = last_err
                    .map(|e| format!("{:#}", e))
                    .unwrap_or_else(|| "database unavailable".to_string());
                error!(path = %self.path.display(), "giving up on journal database");
                Err(JournalError::Storage(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    message
                )))
            })
            .await
    }

    async fn open(&self) -> anyhow::Result<SqlitePool> {
        let pool = db::connect(&self.path).await?;
        migrate::migrate(&pool).await?;
        Ok(pool)
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
    let id: i64 = row.get("id");
    let date: String = row.get("date");
    let mood: Option<String> = row.get("mood");
    let summary: String = row.get("summary");
    let content_json: Option<String> = row.get("content_json");

    let date = DateTime::parse_from_rfc3339(&date)
        .map_err(|e| JournalError::Storage(format!("entry {} has a bad date: {}", id, e)))?
        .with_timezone(&Utc);

    let body = match content_json {
        Some(json) => {
            let turns: Vec<Turn> = serde_json::from_str(&json).map_err(|e| {
                JournalError::Storage(format!("entry {} has bad content: {}", id, e))
            })?;
            EntryBody::Transcript { turns, summary }
        }
        None => EntryBody::Reflection { summary },
    };

    Ok(Entry {
        id,
        date,
        mood,
        body,
    })
}

fn content_json(body: &EntryBody) -> Result<Option<String>> {
    body.turns()
        .map(serde_json::to_string)
        .transpose()
        .map_err(JournalError::storage)
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn add_entry(&self, entry: &NewEntry) -> Result<i64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "INSERT INTO entries (date, mood, summary, content_json) VALUES (?, ?, ?, ?)",
        )
        .bind(format_timestamp(&entry.date))
        .bind(&entry.mood)
        .bind(entry.body.summary())
        .bind(content_json(&entry.body)?)
        .execute(pool)
        .await
        .map_err(JournalError::storage)?;

        Ok(result.last_insert_rowid())
    }

    async fn get_entries(&self) -> Result<Vec<Entry>> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            "SELECT id, date, mood, summary, content_json FROM entries ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
        .map_err(JournalError::storage)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let pool = self.pool().await?;
        let row = sqlx::query(
            "SELECT id, date, mood, summary, content_json FROM entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(JournalError::storage)?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn update_entry(&self, entry: &Entry) -> Result<()> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "UPDATE entries SET mood = ?, summary = ?, content_json = ? WHERE id = ?",
        )
        .bind(&entry.mood)
        .bind(entry.body.summary())
        .bind(content_json(&entry.body)?)
        .bind(entry.id)
        .execute(pool)
        .await
        .map_err(JournalError::storage)?;

        if result.rows_affected() == 0 {
            return Err(JournalError::NotFound(entry.id));
        }
        Ok(())
    }

    async fn delete_entry(&self, id: i64) -> Result<()> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(JournalError::storage)?;

        if result.rows_affected() == 0 {
            return Err(JournalError::NotFound(id));
        }
        Ok(())
    }
}
