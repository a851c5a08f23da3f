//! # Solace Core
//!
//! Runtime-agnostic logic for Solace: the journal entry model, store
//! abstractions, the conversation session state machine, the journal
//! coordinator, search filtering, reply suggestion parsing, export, and
//! insights.
//!
//! This crate contains no tokio, sqlx, network, or filesystem
//! dependencies. Hosts plug in a [`store::EntryStore`], a
//! [`store::SettingsStore`], a [`generator::Generator`] and a
//! [`presenter::Presenter`]; the crate compiles to both native targets and
//! `wasm32-unknown-unknown`.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Entries, turns, roles |
//! | [`error`] | Error taxonomy |
//! | [`store`] | Entry and settings store traits, in-memory backends |
//! | [`settings`] | Typed settings accessor |
//! | [`suggestions`] | Splits a reply into message + quick replies |
//! | [`filter`] | Free-text journal filtering |
//! | [`generator`] | AI text service trait |
//! | [`presenter`] | Push-style presentation callbacks |
//! | [`session`] | Conversation session state machine |
//! | [`journal`] | Journal CRUD, search, import/export orchestration |
//! | [`export`] | Markdown and JSON backup formats |
//! | [`insights`] | Aggregates and calendar grouping |

pub mod error;
pub mod export;
pub mod filter;
pub mod generator;
pub mod insights;
pub mod journal;
pub mod models;
pub mod presenter;
pub mod session;
pub mod settings;
pub mod store;
pub mod suggestions;

pub use error::{GenerationError, JournalError};
pub use models::{Entry, EntryBody, NewEntry, Role, Turn};
