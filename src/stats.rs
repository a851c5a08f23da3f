//! Journal insights: entry counts, journaling days, mood distribution, and
//! an optional per-month calendar. Used by `solace insights`.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use solace_core::insights::{days_with_entries, Insights};

use crate::app::AppContext;

fn parse_month(month: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}': expected YYYY-MM", month))?;
    Ok((first.year(), first.month()))
}

fn bar(count: usize, max: usize) -> String {
    const WIDTH: usize = 20;
    let filled = if max == 0 { 0 } else { (count * WIDTH).div_ceil(max) };
    "#".repeat(filled)
}

fn print_insights(insights: &Insights) {
    println!("Solace Journal Insights");
    println!("=======================");
    println!();
    println!("  Entries:          {}", insights.total_entries);
    println!("  Journaling days:  {}", insights.journaling_days);

    if insights.mood_distribution.is_empty() {
        return;
    }
    println!();
    println!("  Moods:");
    let max = insights
        .mood_distribution
        .first()
        .map(|m| m.count)
        .unwrap_or(0);
    for m in &insights.mood_distribution {
        println!("    {:<10} {:<20} {}", m.mood, bar(m.count, max), m.count);
    }
}

pub async fn run_insights(ctx: &AppContext, month: Option<&str>, json: bool) -> Result<()> {
    let journal = ctx.journal();
    let insights = journal.insights().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.total_entries == 0 {
        println!("No journal entries yet. Start a conversation with `solace chat`.");
        return Ok(());
    }
    print_insights(&insights);

    if let Some(month) = month {
        let (year, m) = parse_month(month)?;
        let entries = journal.load_entries().await?;
        let days = days_with_entries(&entries, year, m);
        println!();
        if days.is_empty() {
            println!("  No entries in {}.", month);
        } else {
            println!("  Days with entries in {}:", month);
            for (day, count) in days {
                println!("    {:>2}  {}", day, count);
            }
        }
    }
    Ok(())
}
