//! Markdown export of single entries and the JSON backup format.

use chrono::{DateTime, Utc};

use crate::error::{JournalError, Result};
use crate::models::{Entry, EntryBody};

/// Render one entry as a markdown document.
///
/// Transcripts list every turn under `## Conversation`; reflections put the
/// summary under `## Reflection`.
pub fn render_markdown(entry: &Entry) -> String {
    let mut md = format!("# Journal Entry - {}\n\n", entry.iso_day());
    md.push_str(&format!(
        "**Mood:** {}\n\n",
        entry.mood.as_deref().unwrap_or("N/A")
    ));

    match &entry.body {
        EntryBody::Transcript { turns, .. } => {
            md.push_str("## Conversation\n\n");
            for turn in turns {
                md.push_str(&format!("**{}:** {}\n\n", turn.role.speaker(), turn.text));
            }
        }
        EntryBody::Reflection { summary } => {
            md.push_str("## Reflection\n\n");
            md.push_str(summary);
            md.push_str("\n\n");
        }
    }
    md
}

pub fn markdown_file_name(entry: &Entry) -> String {
    format!("journal-{}.md", entry.iso_day())
}

/// Pretty-printed JSON array of every entry, ids included.
pub fn backup_json(entries: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(snapshot_failed)
}

fn snapshot_failed(e: serde_json::Error) -> JournalError {
    JournalError::storage(format!("Failed to serialize backup: {}", e))
}

pub fn backup_file_name(today: DateTime<Utc>) -> String {
    format!("solace-backup-{}.json", today.format("%Y-%m-%d"))
}

/// Parse backup text into raw rows. Rows are validated individually on import.
pub fn parse_backup(text: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| JournalError::Validation(format!("Malformed backup: {}", e)))?;
    match value {
        serde_json::Value::Array(rows) => Ok(rows),
        _ => Err(JournalError::Validation("Invalid backup file".to_string())),
    }
}
