//! Free-text filtering of a journal snapshot.
//!
//! A query matches an entry when it is a case-insensitive substring of the
//! summary, the mood, the entry's display date (`M/D/YYYY` in the viewer's
//! time zone), or the joined text of its conversation turns.
//!
//! A blank query means "no filter" and yields `None`; a query that matches
//! nothing yields `Some(vec![])`. Callers render these differently.

use std::fmt;

use chrono::{Local, TimeZone};

use crate::models::Entry;

/// Filter using the local time zone for date matching.
pub fn filter_entries(entries: &[Entry], query: &str) -> Option<Vec<Entry>> {
    filter_entries_in(entries, query, &Local)
}

pub fn filter_entries_in<Tz: TimeZone>(
    entries: &[Entry],
    query: &str,
    tz: &Tz,
) -> Option<Vec<Entry>>
where
    Tz::Offset: fmt::Display,
{
    if query.trim().is_empty() {
        return None;
    }
    let needle = query.to_lowercase();
    Some(
        entries
            .iter()
            .filter(|e| entry_matches(e, &needle, tz))
            .cloned()
            .collect(),
    )
}

/// `M/D/YYYY`, the short date shown next to entries.
pub fn display_date<Tz: TimeZone>(entry: &Entry, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    entry.date.with_timezone(tz).format("%-m/%-d/%Y").to_string()
}

fn entry_matches<Tz: TimeZone>(entry: &Entry, needle: &str, tz: &Tz) -> bool
where
    Tz::Offset: fmt::Display,
{
    if entry.summary().to_lowercase().contains(needle) {
        return true;
    }
    if let Some(mood) = &entry.mood {
        if mood.to_lowercase().contains(needle) {
            return true;
        }
    }
    if display_date(entry, tz).to_lowercase().contains(needle) {
        return true;
    }
    if let Some(turns) = entry.turns() {
        let text = turns
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if text.contains(needle) {
            return true;
        }
    }
    false
}
