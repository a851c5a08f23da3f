//! Aggregates over the journal and calendar-day grouping.
//!
//! Days are calendar days in the viewer's time zone, so an entry written at
//! 23:30 local time belongs to that day even when its UTC date is the next.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub total_entries: usize,
    /// Distinct calendar days with at least one entry.
    pub journaling_days: usize,
    /// Lower-cased moods, most frequent first; ties ordered by name.
    pub mood_distribution: Vec<MoodCount>,
}

pub fn compute(entries: &[Entry]) -> Insights {
    compute_in(entries, &Local)
}

pub fn compute_in<Tz: TimeZone>(entries: &[Entry], tz: &Tz) -> Insights
where
    Tz::Offset: fmt::Display,
{
    let days: BTreeSet<NaiveDate> = entries.iter().map(|e| local_day(e, tz)).collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for mood in entries.iter().filter_map(|e| e.mood.as_deref()) {
        let mood = mood.trim().to_lowercase();
        if mood.is_empty() {
            continue;
        }
        *counts.entry(mood).or_default() += 1;
    }
    let mut mood_distribution: Vec<MoodCount> = counts
        .into_iter()
        .map(|(mood, count)| MoodCount { mood, count })
        .collect();
    mood_distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.mood.cmp(&b.mood)));

    Insights {
        total_entries: entries.len(),
        journaling_days: days.len(),
        mood_distribution,
    }
}

pub fn entries_on_day(entries: &[Entry], day: NaiveDate) -> Vec<Entry> {
    entries_on_day_in(entries, day, &Local)
}

/// Entries written on `day`, in the order given.
pub fn entries_on_day_in<Tz: TimeZone>(entries: &[Entry], day: NaiveDate, tz: &Tz) -> Vec<Entry>
where
    Tz::Offset: fmt::Display,
{
    entries
        .iter()
        .filter(|e| local_day(e, tz) == day)
        .cloned()
        .collect()
}

pub fn days_with_entries(entries: &[Entry], year: i32, month: u32) -> BTreeMap<u32, usize> {
    days_with_entries_in(entries, year, month, &Local)
}

/// Day of month → number of entries, for one month.
pub fn days_with_entries_in<Tz: TimeZone>(
    entries: &[Entry],
    year: i32,
    month: u32,
    tz: &Tz,
) -> BTreeMap<u32, usize>
where
    Tz::Offset: fmt::Display,
{
    let mut days = BTreeMap::new();
    for entry in entries {
        let day = local_day(entry, tz);
        if day.year() == year && day.month() == month {
            *days.entry(day.day()).or_default() += 1;
        }
    }
    days
}

fn local_day<Tz: TimeZone>(entry: &Entry, tz: &Tz) -> NaiveDate {
    entry.date.with_timezone(tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;
    use chrono::{FixedOffset, Utc};

    fn entry(id: i64, y: i32, m: u32, d: u32, h: u32, mood: Option<&str>) -> Entry {
        NewEntry::reflection(
            Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            mood.map(str::to_string),
            format!("entry {}", id),
        )
        .with_id(id)
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(5, 2024, 3, 9, 23, Some("Sad")),
            entry(4, 2024, 3, 9, 8, Some("happy")),
            entry(3, 2024, 3, 2, 12, Some("HAPPY")),
            entry(2, 2024, 2, 28, 12, Some("calm")),
            entry(1, 2024, 2, 28, 9, None),
        ]
    }

    #[test]
    fn test_counts_and_days() {
        let insights = compute_in(&sample(), &Utc);
        assert_eq!(insights.total_entries, 5);
        assert_eq!(insights.journaling_days, 3);
    }

    #[test]
    fn test_mood_distribution_order() {
        let insights = compute_in(&sample(), &Utc);
        let moods: Vec<(&str, usize)> = insights
            .mood_distribution
            .iter()
            .map(|m| (m.mood.as_str(), m.count))
            .collect();
        assert_eq!(moods, vec![("happy", 2), ("calm", 1), ("sad", 1)]);
    }

    #[test]
    fn test_empty_journal() {
        let insights = compute_in(&[], &Utc);
        assert_eq!(insights.total_entries, 0);
        assert_eq!(insights.journaling_days, 0);
        assert!(insights.mood_distribution.is_empty());
    }

    #[test]
    fn test_entries_on_day_uses_time_zone() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(entries_on_day_in(&sample(), day, &Utc).is_empty());

        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let found = entries_on_day_in(&sample(), day, &east);
        assert_eq!(found.iter().map(|e| e.id).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_days_with_entries_for_month() {
        let days = days_with_entries_in(&sample(), 2024, 3, &Utc);
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![(2, 1), (9, 2)]);
        assert!(days_with_entries_in(&sample(), 2023, 3, &Utc).is_empty());
    }
}
