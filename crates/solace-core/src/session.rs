//! Conversation session state machine.
//!
//! ```text
//!   start()        send_message()        end_conversation(mood)
//! ┌──────────┐    ┌──────────┐        ┌─────────────┐
//! │ Greeting │───▶│  Active  │───────▶│ Summarizing │
//! └──────────┘    └──────────┘        └──────┬──────┘
//!      ▲               ▲ cancel_fallback()    │ summary ok ─────────▶ reflection saved
//!      │               │                      │ summary failed, auto ▶ transcript saved
//!      │          ┌────┴─────────────┐        │ summary failed, confirm
//!      │          │ AwaitingFallback │◀───────┘
//!      │          └────┬─────────────┘
//!      │               │ confirm_fallback() ─▶ transcript saved
//!      └───────────────┴── every save resets the session to a fresh greeting
//! ```
//!
//! The session lives only in memory and is written exactly once, as a single
//! entry. Calls are serialized by an explicit busy flag: a second
//! `send_message` / `end_conversation` / fallback call while one is still
//! waiting on the generator or the store fails with
//! [`JournalError::Busy`] instead of interleaving turns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset, Local, Timelike, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{GenerationError, JournalError, Result};
use crate::generator::Generator;
use crate::models::{NewEntry, Role, Turn};
use crate::presenter::Presenter;
use crate::settings::{Mode, Settings};
use crate::store::EntryStore;
use crate::suggestions::{parse_reply, ParsedReply};

/// Shown while the summary is being generated.
pub const GENERATING_MESSAGE: &str = "Generating your journal entry...";

/// Source of the current time. The offset decides the greeting.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let now = Local::now();
        now.with_timezone(now.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Greeting,
    Active,
    Summarizing,
    AwaitingFallback,
}

/// What to do when the summary cannot be generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Save the raw transcript right away.
    #[default]
    Auto,
    /// Wait for [`SessionEngine::confirm_fallback`] or
    /// [`SessionEngine::cancel_fallback`].
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    Replied(ParsedReply),
    /// The generator failed; the error was shown in the conversation.
    Failed(GenerationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// Only the greeting was present.
    NothingToSave,
    Saved { id: i64 },
    SavedRaw { id: i64, error: GenerationError },
    AwaitingConfirmation { error: GenerationError },
}

/// `Good morning.` before noon, `Good afternoon.` before 18:00, else `Good evening.`
pub fn salutation(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning."
    } else if hour < 18 {
        "Good afternoon."
    } else {
        "Good evening."
    }
}

pub fn greeting_for(hour: u32, mode: Mode) -> String {
    format!("{} {}", salutation(hour), mode.prompt())
}

struct Inner {
    state: SessionState,
    turns: Vec<Turn>,
    mood: Option<String>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionEngine {
    store: Arc<dyn EntryStore>,
    generator: Arc<dyn Generator>,
    settings: Settings,
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    fallback: FallbackPolicy,
    busy: AtomicBool,
    next_typing_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl SessionEngine {
    pub fn new(
        store: Arc<dyn EntryStore>,
        generator: Arc<dyn Generator>,
        settings: Settings,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            store,
            generator,
            settings,
            presenter,
            clock: Arc::new(SystemClock),
            fallback: FallbackPolicy::default(),
            busy: AtomicBool::new(false),
            next_typing_id: AtomicU64::new(1),
            inner: Mutex::new(Inner {
                state: SessionState::Greeting,
                turns: Vec::new(),
                mood: None,
            }),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    /// Greet the user and return the greeting.
    pub fn start(&self) -> String {
        self.reset_to_greeting()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.lock().turns.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Persist a new mode; a session that has not started yet is re-greeted.
    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        let _guard = self.begin()?;
        self.settings.set_mode(mode)?;
        if self.state() == SessionState::Greeting {
            self.reset_to_greeting();
        }
        Ok(())
    }

    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        let _guard = self.begin()?;
        let model = self.settings.model()?;

        let history = {
            let mut inner = self.lock();
            if inner.state == SessionState::AwaitingFallback {
                debug!("new message cancels the pending raw save");
            }
            inner.turns.push(Turn::user(text));
            inner.state = SessionState::Active;
            inner.turns.clone()
        };
        self.presenter.on_suggestions(&[]);
        self.presenter.on_message(text, Role::User);

        let typing = self.typing_start();
        let result = self.generator.generate_reply(&model, text, &history).await;
        self.presenter.on_typing_end(typing);

        match result {
            Ok(raw) => {
                let parsed = parse_reply(&raw);
                self.lock().turns.push(Turn::ai(parsed.message.clone()));
                self.presenter.on_message(&parsed.message, Role::Ai);
                self.presenter.on_suggestions(&parsed.suggestions);
                Ok(SendOutcome::Replied(parsed))
            }
            Err(error) => {
                warn!(error = %error, "reply generation failed");
                self.presenter
                    .on_message(&format!("Error: {}", error.message), Role::Ai);
                Ok(SendOutcome::Failed(error))
            }
        }
    }

    /// Summarize the conversation and store it as one entry.
    pub async fn end_conversation(&self, mood: Option<String>) -> Result<EndOutcome> {
        let _guard = self.begin()?;
        if self.lock().turns.len() <= 1 {
            debug!("nothing to save yet");
            return Ok(EndOutcome::NothingToSave);
        }
        let model = self.settings.model()?;

        let (turns, mood) = {
            let mut inner = self.lock();
            inner.mood = mood;
            inner.state = SessionState::Summarizing;
            (inner.turns.clone(), inner.mood.clone())
        };
        self.presenter.on_modal_close();

        let typing = self.typing_start();
        self.presenter.on_message(GENERATING_MESSAGE, Role::Ai);
        let result = self
            .generator
            .generate_summary(&turns, mood.as_deref(), &model)
            .await;
        self.presenter.on_typing_end(typing);

        match result {
            Ok(summary) => {
                let entry = NewEntry::reflection(self.now_utc(), mood, summary);
                let id = self.persist(&entry).await?;
                Ok(EndOutcome::Saved { id })
            }
            Err(error) => {
                warn!(error = %error, policy = ?self.fallback, "summary generation failed");
                match self.fallback {
                    FallbackPolicy::Auto => {
                        self.presenter.on_message(
                            &format!(
                                "Failed to generate journal summary: {}\n\nSaving the raw conversation instead.",
                                error.message
                            ),
                            Role::Ai,
                        );
                        let id = self.save_raw().await?;
                        Ok(EndOutcome::SavedRaw { id, error })
                    }
                    FallbackPolicy::Confirm => {
                        self.presenter.on_message(
                            &format!(
                                "Failed to generate journal summary: {}\n\nWould you like to save the raw conversation instead?",
                                error.message
                            ),
                            Role::Ai,
                        );
                        self.lock().state = SessionState::AwaitingFallback;
                        Ok(EndOutcome::AwaitingConfirmation { error })
                    }
                }
            }
        }
    }

    /// Save the raw transcript after a failed summary.
    pub async fn confirm_fallback(&self) -> Result<i64> {
        let _guard = self.begin()?;
        if self.state() != SessionState::AwaitingFallback {
            return Err(JournalError::NoPendingFallback);
        }
        self.save_raw().await
    }

    /// Keep chatting instead of saving the raw transcript.
    pub fn cancel_fallback(&self) -> Result<()> {
        let _guard = self.begin()?;
        let mut inner = self.lock();
        if inner.state != SessionState::AwaitingFallback {
            return Err(JournalError::NoPendingFallback);
        }
        inner.state = SessionState::Active;
        Ok(())
    }

    async fn save_raw(&self) -> Result<i64> {
        let (turns, mood) = {
            let inner = self.lock();
            (inner.turns.clone(), inner.mood.clone())
        };
        let entry = NewEntry::transcript(self.now_utc(), mood, turns);
        self.persist(&entry).await
    }

    async fn persist(&self, entry: &NewEntry) -> Result<i64> {
        match self.store.add_entry(entry).await {
            Ok(id) => {
                info!(id, transcript = entry.body.turns().is_some(), "journal entry created");
                self.reset_to_greeting();
                self.presenter.on_entry_created(id);
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "failed to store journal entry; session kept");
                self.lock().state = SessionState::Active;
                Err(e)
            }
        }
    }

    fn reset_to_greeting(&self) -> String {
        let mode = self.settings.mode().unwrap_or_else(|e| {
            warn!(error = %e, "could not read mode; using default greeting");
            Mode::default()
        });
        let greeting = greeting_for(self.clock.now().hour(), mode);
        {
            let mut inner = self.lock();
            inner.turns = vec![Turn::ai(greeting.clone())];
            inner.mood = None;
            inner.state = SessionState::Greeting;
        }
        self.presenter.on_chat_cleared();
        self.presenter.on_suggestions(&[]);
        self.presenter.on_message(&greeting, Role::Ai);
        greeting
    }

    fn begin(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| JournalError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn typing_start(&self) -> u64 {
        let id = self.next_typing_id.fetch_add(1, Ordering::Relaxed);
        self.presenter.on_typing_start(id);
        id
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}
