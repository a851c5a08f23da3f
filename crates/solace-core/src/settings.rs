//! Typed access to user settings.
//!
//! Settings are plain strings in a [`SettingsStore`]. Everything else in
//! the crate reads and writes them through [`Settings`], which owns the key
//! names, defaults and value parsing.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{JournalError, Result};
use crate::store::SettingsStore;

pub const API_KEY: &str = "api_key";
pub const MODEL: &str = "model";
pub const THEME: &str = "theme";
pub const MODE: &str = "mode";

/// Every key the application knows about.
pub const KNOWN_KEYS: [&str; 4] = [API_KEY, MODEL, THEME, MODE];

pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation mode; selects the greeting prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Default,
    Gratitude,
    Reflection,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Gratitude => "gratitude",
            Mode::Reflection => "reflection",
        }
    }

    /// Question appended to the time-of-day salutation.
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::Gratitude => "What are you grateful for today?",
            Mode::Reflection => "What's on your mind?",
            Mode::Default => "How was your day?",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(Mode::Default),
            "gratitude" => Ok(Mode::Gratitude),
            "reflection" => Ok(Mode::Reflection),
            other => Err(JournalError::Validation(format!(
                "unknown mode '{}': must be default, gratitude, or reflection",
                other
            ))),
        }
    }
}

impl FromStr for Theme {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(JournalError::Validation(format!(
                "unknown theme '{}': must be light or dark",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.get_setting(key)
    }

    /// Validates well-known keys before writing.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        match key {
            THEME => {
                value.parse::<Theme>()?;
            }
            MODE => {
                value.parse::<Mode>()?;
            }
            _ => {}
        }
        debug!(key, "setting updated");
        self.store.set_setting(key, value)
    }

    pub fn api_key(&self) -> Result<Option<String>> {
        Ok(self.get(API_KEY)?.filter(|k| !k.trim().is_empty()))
    }

    pub fn model(&self) -> Result<String> {
        Ok(self
            .get(MODEL)?
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()))
    }

    pub fn theme(&self) -> Result<Theme> {
        match self.get(THEME)? {
            Some(value) => value.parse(),
            None => Ok(Theme::default()),
        }
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme()?.toggled();
        self.store.set_setting(THEME, next.as_str())?;
        Ok(next)
    }

    pub fn mode(&self) -> Result<Mode> {
        match self.get(MODE)? {
            Some(value) => value.parse(),
            None => Ok(Mode::default()),
        }
    }

    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.store.set_setting(MODE, mode.as_str())
    }
}
