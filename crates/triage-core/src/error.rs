use thiserror::Error;

use crate::types::Stage;

/// Top-level error type for the triage system.
///
/// `InvalidSession` and `ModelUnavailable` are surfaced to the user (restart
/// the conversation, or retry later). A symptom that cannot be recognized is
/// not an error: matchers return `Ok(None)` for it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TriageError {
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Symptom vocabulary must not be empty")]
    InvalidVocabulary,

    #[error("Cannot classify an empty symptom set")]
    EmptySymptomSet,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Stage cannot move backwards: {current} -> {requested}")]
    StageRegression { current: Stage, requested: Stage },

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<toml::de::Error> for TriageError {
    fn from(err: toml::de::Error) -> Self {
        TriageError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TriageError {
    fn from(err: toml::ser::Error) -> Self {
        TriageError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
