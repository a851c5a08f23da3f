//! Journal browsing commands: `list`, `search`, `show`, `edit`, `delete`, `day`.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};

use solace_core::filter::display_date;
use solace_core::models::Entry;

use crate::app::AppContext;

/// One line per entry: id, local date, mood, preview.
fn print_entry_line(entry: &Entry) {
    let mood = entry
        .mood
        .as_deref()
        .map(|m| format!(" [{}]", m))
        .unwrap_or_default();
    let kind = if entry.is_transcript() { " (raw)" } else { "" };
    println!(
        "#{:<4} {}{}{}",
        entry.id,
        display_date(entry, &Local),
        mood,
        kind
    );
    println!("      {}", entry.preview().replace('\n', " "));
}

fn print_entries(entries: &[Entry]) {
    for entry in entries {
        print_entry_line(entry);
    }
}

pub async fn run_list(ctx: &AppContext, limit: Option<usize>) -> Result<()> {
    let entries = ctx.journal().load_entries().await?;
    if entries.is_empty() {
        println!("No journal entries yet.");
        return Ok(());
    }
    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    print_entries(&entries[..shown]);
    if shown < entries.len() {
        println!();
        println!("{} of {} entries shown.", shown, entries.len());
    }
    Ok(())
}

pub async fn run_search(ctx: &AppContext, query: &str) -> Result<()> {
    let journal = ctx.journal();
    match journal.filter_journal(query).await? {
        None => {
            let entries = journal.load_entries().await?;
            print_entries(&entries);
        }
        Some(found) if found.is_empty() => println!("No entries match \"{}\".", query),
        Some(found) => {
            print_entries(&found);
            println!();
            println!("{} matching entries.", found.len());
        }
    }
    Ok(())
}

pub async fn run_show(ctx: &AppContext, id: i64, json: bool) -> Result<()> {
    let entry = ctx.journal().get_entry(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("Entry #{}", entry.id);
    println!("Date:  {}", entry.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!("Mood:  {}", entry.mood.as_deref().unwrap_or("N/A"));
    println!();
    println!("{}", entry.summary());
    if let Some(turns) = entry.turns() {
        println!();
        println!("--- Conversation ---");
        for turn in turns {
            println!("{}: {}", turn.role.speaker(), turn.text);
        }
    }
    Ok(())
}

pub async fn run_edit(
    ctx: &AppContext,
    id: i64,
    summary: Option<String>,
    mood: Option<String>,
    clear_mood: bool,
) -> Result<()> {
    if summary.is_none() && mood.is_none() && !clear_mood {
        bail!("Nothing to change: pass --summary, --mood, or --clear-mood");
    }
    let journal = ctx.journal();
    let mut entry = journal.get_entry(id).await?;
    if let Some(summary) = summary {
        entry.body.set_summary(summary);
    }
    if clear_mood {
        entry.mood = None;
    } else if let Some(mood) = mood {
        entry.mood = Some(mood);
    }
    journal.update_entry(&entry).await?;
    println!("Updated entry #{}.", id);
    Ok(())
}

pub async fn run_delete(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.journal().delete_entry(id).await?;
    println!("Deleted entry #{}.", id);
    Ok(())
}

pub async fn run_day(ctx: &AppContext, day: &str) -> Result<()> {
    let day = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", day))?;
    let entries = ctx.journal().entries_on_day(day).await?;
    if entries.is_empty() {
        println!("No entries on {}.", day);
        return Ok(());
    }
    print_entries(&entries);
    Ok(())
}
