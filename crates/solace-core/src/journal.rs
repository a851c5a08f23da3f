//! Journal browsing and maintenance on top of an [`EntryStore`].
//!
//! The coordinator remembers the active search so that edits and deletions
//! refresh the filtered view instead of dropping it.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::export;
use crate::filter::filter_entries;
use crate::insights::{self, Insights};
use crate::models::Entry;
use crate::presenter::Presenter;
use crate::store::{EntryStore, ImportReport};

/// A rendered export, ready to be written under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

#[derive(Default)]
struct SearchState {
    query: Option<String>,
    filtered: Option<Vec<Entry>>,
}

pub struct JournalCoordinator {
    store: Arc<dyn EntryStore>,
    presenter: Arc<dyn Presenter>,
    search: Mutex<SearchState>,
}

impl JournalCoordinator {
    pub fn new(store: Arc<dyn EntryStore>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            store,
            presenter,
            search: Mutex::new(SearchState::default()),
        }
    }

    /// Reload every entry, re-applying the active search.
    pub async fn load_entries(&self) -> Result<Vec<Entry>> {
        let entries = self.store.get_entries().await?;
        let filtered = {
            let mut search = self.search();
            search.filtered = search
                .query
                .as_deref()
                .and_then(|q| filter_entries(&entries, q));
            search.filtered.clone()
        };
        self.presenter
            .on_entries_changed(&entries, filtered.as_deref());
        Ok(entries)
    }

    /// `None` when the query is blank and the search was cleared.
    pub async fn filter_journal(&self, query: &str) -> Result<Option<Vec<Entry>>> {
        let entries = self.store.get_entries().await?;
        let filtered = filter_entries(&entries, query);
        {
            let mut search = self.search();
            search.query = filtered.as_ref().map(|_| query.to_string());
            search.filtered = filtered.clone();
        }
        debug!(query, matches = ?filtered.as_ref().map(Vec::len), "journal filtered");
        self.presenter
            .on_entries_changed(&entries, filtered.as_deref());
        Ok(filtered)
    }

    pub async fn clear_search(&self) -> Result<Vec<Entry>> {
        *self.search() = SearchState::default();
        self.load_entries().await
    }

    pub fn active_query(&self) -> Option<String> {
        self.search().query.clone()
    }

    pub fn filtered(&self) -> Option<Vec<Entry>> {
        self.search().filtered.clone()
    }

    pub async fn get_entry(&self, id: i64) -> Result<Entry> {
        self.store
            .get_entry(id)
            .await?
            .ok_or(JournalError::NotFound(id))
    }

    pub async fn update_entry(&self, entry: &Entry) -> Result<()> {
        self.store.update_entry(entry).await?;
        info!(id = entry.id, "journal entry updated");
        self.load_entries().await?;
        self.presenter.on_modal_close();
        Ok(())
    }

    pub async fn delete_entry(&self, id: i64) -> Result<()> {
        self.store.delete_entry(id).await?;
        info!(id, "journal entry deleted");
        self.load_entries().await?;
        self.presenter.on_modal_close();
        Ok(())
    }

    pub fn export_entry(&self, entry: &Entry) -> ExportFile {
        ExportFile {
            file_name: export::markdown_file_name(entry),
            contents: export::render_markdown(entry),
        }
    }

    pub async fn export_all(&self) -> Result<ExportFile> {
        let entries = self.store.get_entries().await?;
        Ok(ExportFile {
            file_name: export::backup_file_name(Utc::now()),
            contents: export::backup_json(&entries)?,
        })
    }

    /// Import a JSON backup. Fails only when the text is not a JSON array.
    ///
    /// Imported rows are committed before the view refresh, so a failed
    /// refresh is logged and the report is still returned.
    pub async fn import_entries(&self, text: &str) -> Result<ImportReport> {
        let rows = export::parse_backup(text)?;
        let report = self.store.import_entries(&rows).await?;
        info!(
            completed = report.completed,
            errors = report.errors,
            "import finished"
        );
        if let Err(e) = self.load_entries().await {
            warn!(error = %e, "failed to refresh entries after import");
        }
        Ok(report)
    }

    pub async fn insights(&self) -> Result<Insights> {
        let entries = self.store.get_entries().await?;
        Ok(insights::compute(&entries))
    }

    pub async fn entries_on_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        let entries = self.store.get_entries().await?;
        Ok(insights::entries_on_day(&entries, day))
    }

    fn search(&self) -> MutexGuard<'_, SearchState> {
        self.search.lock().unwrap_or_else(|e| e.into_inner())
    }
}
