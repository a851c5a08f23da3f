//! Core data models: conversation turns and journal entries.
//!
//! An entry is either a **reflection** (an AI-written summary of the
//! conversation) or a **transcript** (the raw turns, saved when the summary
//! could not be generated). On the wire both are the same flat JSON object;
//! the presence of `content` tells them apart.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters kept when deriving a summary from user turns.
pub const FALLBACK_SUMMARY_CHARS: usize = 200;

/// Number of characters shown in an entry preview.
pub const PREVIEW_CHARS: usize = 200;

/// Moods offered when ending a conversation.
pub const MOODS: [&str; 6] = ["happy", "calm", "neutral", "sad", "anxious", "angry"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl Role {
    /// Speaker label used in transcripts and summary prompts.
    pub fn speaker(&self) -> &'static str {
        match self {
            Role::User => "Me",
            Role::Ai => "Solace",
        }
    }
}

/// One unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
        }
    }
}

/// The two shapes an entry can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// AI-generated reflection; the conversation itself is not kept.
    Reflection { summary: String },
    /// Raw conversation with a summary derived from the user's turns.
    Transcript { turns: Vec<Turn>, summary: String },
}

impl EntryBody {
    pub fn summary(&self) -> &str {
        match self {
            EntryBody::Reflection { summary } | EntryBody::Transcript { summary, .. } => summary,
        }
    }

    pub fn turns(&self) -> Option<&[Turn]> {
        match self {
            EntryBody::Reflection { .. } => None,
            EntryBody::Transcript { turns, .. } => Some(turns),
        }
    }

    pub fn set_summary(&mut self, text: impl Into<String>) {
        match self {
            EntryBody::Reflection { summary } | EntryBody::Transcript { summary, .. } => {
                *summary = text.into()
            }
        }
    }
}

/// An entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord", into = "EntryRecord")]
pub struct NewEntry {
    pub date: DateTime<Utc>,
    pub mood: Option<String>,
    pub body: EntryBody,
}

impl NewEntry {
    pub fn reflection(
        date: DateTime<Utc>,
        mood: Option<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            date,
            mood,
            body: EntryBody::Reflection {
                summary: summary.into(),
            },
        }
    }

    /// Builds a raw transcript entry, deriving its summary from the user turns.
    pub fn transcript(date: DateTime<Utc>, mood: Option<String>, turns: Vec<Turn>) -> Self {
        let summary = derive_summary(&turns);
        Self {
            date,
            mood,
            body: EntryBody::Transcript { turns, summary },
        }
    }

    pub fn with_id(self, id: i64) -> Entry {
        Entry {
            id,
            date: self.date,
            mood: self.mood,
            body: self.body,
        }
    }
}

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord", into = "EntryRecord")]
pub struct Entry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub mood: Option<String>,
    pub body: EntryBody,
}

impl Entry {
    pub fn summary(&self) -> &str {
        self.body.summary()
    }

    pub fn turns(&self) -> Option<&[Turn]> {
        self.body.turns()
    }

    pub fn is_transcript(&self) -> bool {
        matches!(self.body, EntryBody::Transcript { .. })
    }

    /// Calendar date of creation in UTC, `YYYY-MM-DD`.
    pub fn iso_day(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Short text for list views.
    pub fn preview(&self) -> String {
        let summary = self.summary();
        if summary.is_empty() {
            return if self.is_transcript() {
                "Raw conversation".to_string()
            } else {
                "No summary".to_string()
            };
        }
        if summary.chars().count() > PREVIEW_CHARS {
            let head: String = summary.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            summary.to_string()
        }
    }

    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            date: self.date,
            mood: self.mood.clone(),
            body: self.body.clone(),
        }
    }
}

/// Summary used when the AI summary is unavailable: the user's turns joined
/// with spaces, cut to [`FALLBACK_SUMMARY_CHARS`], followed by `...`.
pub fn derive_summary(turns: &[Turn]) -> String {
    let joined = turns
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let head: String = joined.chars().take(FALLBACK_SUMMARY_CHARS).collect();
    format!("{}...", head)
}

/// Timestamp text used for storage: RFC 3339, millisecond precision, `Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Flat wire shape shared by the JSON backup format and the stores.
#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    date: DateTime<Utc>,
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<Turn>>,
}

fn body_from_record(summary: Option<String>, content: Option<Vec<Turn>>) -> Result<EntryBody, String> {
    match (summary, content) {
        (summary, Some(turns)) => {
            let summary = summary.unwrap_or_else(|| derive_summary(&turns));
            Ok(EntryBody::Transcript { turns, summary })
        }
        (Some(summary), None) => Ok(EntryBody::Reflection { summary }),
        (None, None) => Err("entry has neither a summary nor conversation content".to_string()),
    }
}

fn record_from_body(id: Option<i64>, date: DateTime<Utc>, mood: Option<String>, body: EntryBody) -> EntryRecord {
    let (summary, content) = match body {
        EntryBody::Reflection { summary } => (summary, None),
        EntryBody::Transcript { turns, summary } => (summary, Some(turns)),
    };
    EntryRecord {
        id,
        date,
        mood,
        summary: Some(summary),
        content,
    }
}

impl TryFrom<EntryRecord> for NewEntry {
    type Error = String;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        Ok(NewEntry {
            date: record.date,
            mood: record.mood,
            body: body_from_record(record.summary, record.content)?,
        })
    }
}

impl From<NewEntry> for EntryRecord {
    fn from(entry: NewEntry) -> Self {
        record_from_body(None, entry.date, entry.mood, entry.body)
    }
}

impl TryFrom<EntryRecord> for Entry {
    type Error = String;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let id = record.id.ok_or_else(|| "entry is missing an id".to_string())?;
        Ok(Entry {
            id,
            date: record.date,
            mood: record.mood,
            body: body_from_record(record.summary, record.content)?,
        })
    }
}

impl From<Entry> for EntryRecord {
    fn from(entry: Entry) -> Self {
        record_from_body(Some(entry.id), entry.date, entry.mood, entry.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 21, 15, 0).unwrap()
    }

    #[test]
    fn test_derive_summary_uses_only_user_turns() {
        let turns = vec![
            Turn::ai("Good evening. How was your day?"),
            Turn::user("Long."),
            Turn::ai("Tell me more."),
            Turn::user("Meetings all afternoon."),
        ];
        assert_eq!(derive_summary(&turns), "Long. Meetings all afternoon....");
    }

    #[test]
    fn test_derive_summary_truncates_to_200_chars() {
        let turns = vec![Turn::user("a".repeat(150)), Turn::user("b".repeat(150))];
        let summary = derive_summary(&turns);
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("b..."));
        assert_eq!(&summary[..150], "a".repeat(150));
    }

    #[test]
    fn test_reflection_serializes_without_content() {
        let entry = NewEntry::reflection(ts(), Some("calm".into()), "A quiet day.").with_id(4);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["summary"], "A quiet day.");
        assert_eq!(json["mood"], "calm");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_transcript_serializes_content() {
        let entry = NewEntry::transcript(ts(), None, vec![Turn::ai("Hi"), Turn::user("Hey")])
            .with_id(1);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["content"][0]["role"], "ai");
        assert_eq!(json["content"][1]["text"], "Hey");
        assert_eq!(json["summary"], "Hey...");

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_record_with_content_and_no_summary_derives_one() {
        let json = serde_json::json!({
            "date": "2024-03-09T21:15:00.000Z",
            "content": [{"role": "user", "text": "Walked the dog"}]
        });
        let entry: NewEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.body.summary(), "Walked the dog...");
        assert_eq!(entry.mood, None);
    }

    #[test]
    fn test_record_with_neither_shape_is_rejected() {
        let json = serde_json::json!({ "date": "2024-03-09T21:15:00.000Z", "mood": "sad" });
        assert!(serde_json::from_value::<NewEntry>(json).is_err());
    }

    #[test]
    fn test_entry_requires_id() {
        let json = serde_json::json!({ "date": "2024-03-09T21:15:00Z", "summary": "x" });
        assert!(serde_json::from_value::<Entry>(json).is_err());
    }

    #[test]
    fn test_preview_truncates_long_summaries() {
        let entry = NewEntry::reflection(ts(), None, "x".repeat(250)).with_id(1);
        let preview = entry.preview();
        assert_eq!(preview.chars().count(), 203);

        let empty = NewEntry::reflection(ts(), None, "").with_id(2);
        assert_eq!(empty.preview(), "No summary");
    }

    #[test]
    fn test_format_timestamp_matches_iso_millis() {
        assert_eq!(format_timestamp(&ts()), "2024-03-09T21:15:00.000Z");
    }
}
