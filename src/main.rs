//! # Solace CLI (`solace`)
//!
//! Chat with an assistant about your day and keep the result as a journal
//! entry. Every command reads the TOML file given by `--config`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `solace init` | Create the SQLite database and run schema migrations |
//! | `solace chat` | Start an interactive session |
//! | `solace list` | List journal entries, newest first |
//! | `solace search "<query>"` | Filter entries by text, mood, or date |
//! | `solace show <id>` | Print one entry |
//! | `solace edit <id>` | Change an entry's summary or mood |
//! | `solace delete <id>` | Delete an entry |
//! | `solace export <id>` | Export an entry as markdown |
//! | `solace backup` | Write a JSON backup of all entries |
//! | `solace import <file>` | Import a JSON backup |
//! | `solace insights` | Counts and mood distribution |
//! | `solace day <YYYY-MM-DD>` | Entries written on one day |
//! | `solace settings get\|set\|theme` | Read and change settings |
//! | `solace models` | List Gemini models available to your key |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use solace::app::AppContext;
use solace::{chat, config, entries, export, migrate, settings_cmd, stats};

/// Solace, a local-first AI journaling companion.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/solace.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "solace",
    about = "Solace, a local-first AI journaling companion",
    version,
    long_about = "Solace lets you talk through your day with an AI companion. When the \
    conversation ends it is distilled into a first-person journal entry and stored locally \
    in SQLite, where you can browse, search, edit, export, and back it up."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/solace.toml`.
    #[arg(long, global = true, default_value = "./config/solace.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the entries table. Running it
    /// more than once is safe.
    Init,

    /// Start an interactive chat session.
    ///
    /// Type to talk; `/end [mood]` saves the conversation to your journal.
    /// `/help` lists all chat commands.
    Chat,

    /// List journal entries, newest first.
    List {
        /// Show at most this many entries.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search entries by summary, mood, date (M/D/YYYY), or conversation text.
    Search {
        /// Case-insensitive search text.
        query: String,
    },

    /// Print one entry in full.
    Show {
        /// Entry id.
        id: i64,

        /// Print the entry in the JSON backup format.
        #[arg(long)]
        json: bool,
    },

    /// Change an entry's summary or mood. The date never changes.
    Edit {
        /// Entry id.
        id: i64,

        /// New summary text.
        #[arg(long)]
        summary: Option<String>,

        /// New mood.
        #[arg(long, conflicts_with = "clear_mood")]
        mood: Option<String>,

        /// Remove the mood.
        #[arg(long)]
        clear_mood: bool,
    },

    /// Delete an entry.
    Delete {
        /// Entry id.
        id: i64,
    },

    /// Export an entry as markdown.
    ///
    /// Writes `journal-<YYYY-MM-DD>.md` into `--out`, or prints to stdout.
    Export {
        /// Entry id.
        id: i64,

        /// Directory to write the file into.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write every entry to `solace-backup-<YYYY-MM-DD>.json`.
    Backup {
        /// Directory to write the backup into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Import entries from a JSON backup. Imported entries get new ids.
    Import {
        /// Path to the backup file.
        file: PathBuf,
    },

    /// Show entry counts, journaling days, and mood distribution.
    Insights {
        /// Also list the days with entries in this month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the entries written on one day (YYYY-MM-DD, local time).
    Day {
        /// The day to show.
        date: String,
    },

    /// Read and change settings (api_key, model, theme, mode).
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List Gemini models that support text generation.
    Models,
}

/// Settings subcommands.
#[derive(Subcommand)]
enum SettingsAction {
    /// Print one setting, or all known settings.
    Get {
        /// Setting name.
        key: Option<String>,
    },
    /// Overwrite a setting.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: String,
    },
    /// Switch between the light and dark theme.
    Theme,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cfg = config::load_config(&cli.config)?;

    if let Commands::Init = cli.command {
        migrate::run_migrations(&cfg).await?;
        println!("Database initialized successfully.");
        return Ok(());
    }

    let ctx = AppContext::open(&cfg)?;

    match cli.command {
        Commands::Init => {}
        Commands::Chat => {
            chat::run_chat(&ctx).await?;
        }
        Commands::List { limit } => {
            entries::run_list(&ctx, limit).await?;
        }
        Commands::Search { query } => {
            entries::run_search(&ctx, &query).await?;
        }
        Commands::Show { id, json } => {
            entries::run_show(&ctx, id, json).await?;
        }
        Commands::Edit {
            id,
            summary,
            mood,
            clear_mood,
        } => {
            entries::run_edit(&ctx, id, summary, mood, clear_mood).await?;
        }
        Commands::Delete { id } => {
            entries::run_delete(&ctx, id).await?;
        }
        Commands::Export { id, out } => {
            export::run_export(&ctx, id, out).await?;
        }
        Commands::Backup { out } => {
            export::run_backup(&ctx, &out).await?;
        }
        Commands::Import { file } => {
            export::run_import(&ctx, &file).await?;
        }
        Commands::Insights { month, json } => {
            stats::run_insights(&ctx, month.as_deref(), json).await?;
        }
        Commands::Day { date } => {
            entries::run_day(&ctx, &date).await?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Get { key } => settings_cmd::run_get(&ctx, key.as_deref())?,
            SettingsAction::Set { key, value } => settings_cmd::run_set(&ctx, &key, &value)?,
            SettingsAction::Theme => settings_cmd::run_toggle_theme(&ctx)?,
        },
        Commands::Models => {
            settings_cmd::run_models(&ctx).await?;
        }
    }

    Ok(())
}
