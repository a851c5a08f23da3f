//! Terminal rendering of session events.
//!
//! Conversation text goes to stdout. The typing indicator is written to
//! stderr, and only when stderr is a TTY.

use solace_core::models::Role;
use solace_core::presenter::Presenter;
use std::io::Write;

pub struct TerminalPresenter {
    show_typing: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            show_typing: atty::is(atty::Stream::Stderr),
        }
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn on_message(&self, text: &str, role: Role) {
        // the user's own line is already on screen
        if role == Role::Ai {
            println!("{}: {}", role.speaker(), text);
            println!();
        }
    }

    fn on_typing_start(&self, _id: u64) {
        if self.show_typing {
            eprint!("Solace is typing...");
            let _ = std::io::stderr().flush();
        }
    }

    fn on_typing_end(&self, _id: u64) {
        if self.show_typing {
            eprint!("\r\x1b[2K");
            let _ = std::io::stderr().flush();
        }
    }

    fn on_suggestions(&self, suggestions: &[String]) {
        if suggestions.is_empty() {
            return;
        }
        for (i, s) in suggestions.iter().enumerate() {
            println!("  /{} {}", i + 1, s);
        }
        println!();
    }

    fn on_entry_created(&self, id: i64) {
        println!("Saved journal entry #{}.", id);
        println!();
    }
}
