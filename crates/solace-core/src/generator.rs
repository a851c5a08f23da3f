//! The AI text service consumed by the session engine.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::models::Turn;

/// External text-generation service.
///
/// Both calls fail with a [`GenerationError`] whose message is shown to the
/// user as-is.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce the next assistant reply.
    ///
    /// `history` is the full conversation so far and already ends with the
    /// user turn carrying `prompt`.
    async fn generate_reply(
        &self,
        model: &str,
        prompt: &str,
        history: &[Turn],
    ) -> Result<String, GenerationError>;

    /// Write a first-person journal entry from the conversation.
    async fn generate_summary(
        &self,
        history: &[Turn],
        mood: Option<&str>,
        model: &str,
    ) -> Result<String, GenerationError>;
}

/// Render turns as `Speaker: text` lines.
pub fn transcript_text(history: &[Turn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", t.role.speaker(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
