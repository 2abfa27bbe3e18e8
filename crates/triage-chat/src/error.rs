//! Error types for the conversational layer.

use triage_core::error::TriageError;
use triage_core::types::Stage;

/// Errors from handling a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("invalid stage transition: {0} -> {1}")]
    InvalidTransition(Stage, Stage),
    /// The turn did not run to completion (a worker panicked or was
    /// cancelled).
    #[error("chat turn aborted: {0}")]
    TurnAborted(String),
    #[error(transparent)]
    Triage(#[from] TriageError),
}

impl ChatError {
    /// Text suitable for showing to the person chatting.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::EmptyMessage => "Please type a message.".to_string(),
            ChatError::MessageTooLong(max) => {
                format!("Please keep messages under {} characters.", max)
            }
            ChatError::Triage(TriageError::InvalidSession(_)) => {
                "Your session is no longer valid. Please start a new conversation.".to_string()
            }
            ChatError::Triage(TriageError::ModelUnavailable(_)) => {
                "The diagnosis service is temporarily unavailable. Please try again later."
                    .to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the caller must start a new session to continue.
    pub fn requires_restart(&self) -> bool {
        matches!(self, ChatError::Triage(TriageError::InvalidSession(_)))
    }
}
