//! Push-style callbacks into the presentation layer.
//!
//! The core never reads UI state; it only reports what happened. Every
//! method has a no-op default so a presenter implements just what it shows.

use crate::models::{Entry, Role};

pub trait Presenter: Send + Sync {
    fn on_message(&self, _text: &str, _role: Role) {}

    fn on_typing_start(&self, _id: u64) {}

    fn on_typing_end(&self, _id: u64) {}

    /// Replaces the quick-reply chips; an empty slice clears them.
    fn on_suggestions(&self, _suggestions: &[String]) {}

    /// `filtered` is `None` when no search is active.
    fn on_entries_changed(&self, _entries: &[Entry], _filtered: Option<&[Entry]>) {}

    fn on_modal_close(&self) {}

    /// The conversation view was reset for a new session.
    fn on_chat_cleared(&self) {}

    fn on_entry_created(&self, _id: i64) {}
}

/// Presenter that ignores everything.
pub struct NullPresenter;

impl Presenter for NullPresenter {}
