//! # Solace
//!
//! A local-first AI journaling companion. You talk through your day with an
//! assistant; when you are done the conversation becomes a journal entry.
//!
//! This crate is the native host for [`solace_core`]: it supplies the SQLite
//! entry store, the TOML settings file, the Gemini generator, and the
//! terminal presenter, and wires them into the `solace` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌──────────────┐
//! │   CLI    │──▶│ SessionEngine  │──▶│ Gemini (HTTP)│
//! │ (solace) │   └───────┬────────┘   └──────────────┘
//! │          │           │ one entry per session
//! │          │   ┌───────▼────────┐   ┌──────────────┐
//! │          │──▶│ JournalCoord.  │──▶│    SQLite    │
//! └──────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! solace init                        # create database
//! solace settings set api_key <KEY>  # or export GEMINI_API_KEY
//! solace chat                        # talk, then /end calm
//! solace list
//! solace search "beach"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite entry store |
//! | [`settings_file`] | TOML-file settings store |
//! | [`gemini`] | Gemini generator and model listing |
//! | [`presenter`] | Terminal presenter |
//! | [`app`] | Backend wiring |
//! | [`chat`] | Interactive chat command |
//! | [`entries`] | Journal browsing commands |
//! | [`export`] | Markdown export, backup, import |
//! | [`stats`] | Insights command |
//! | [`settings_cmd`] | Settings and model commands |

pub mod app;
pub mod chat;
pub mod config;
pub mod db;
pub mod entries;
pub mod export;
pub mod gemini;
pub mod migrate;
pub mod presenter;
pub mod settings_cmd;
pub mod settings_file;
pub mod sqlite_store;
pub mod stats;
