use thiserror::Error;

/// Failure reported by the AI text service.
///
/// The message is human readable and is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entry {0} not found")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("A previous request is still in progress")]
    Busy,

    #[error("There is no failed summary waiting for confirmation")]
    NoPendingFallback,
}

impl JournalError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T, E = JournalError> = std::result::Result<T, E>;
