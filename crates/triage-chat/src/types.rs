//! Reply types returned by the orchestrator.

use serde::Serialize;

use triage_core::types::{SessionToken, Stage};

/// What a turn accomplished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// A new session was opened.
    Greeting,
    /// A new symptom was added to the session.
    SymptomRecorded { symptom: String, total: usize },
    /// The recognized symptom was already held.
    AlreadyRecorded { symptom: String },
    /// No vocabulary symptom was recognized.
    NoMatch,
    /// Diagnosis was requested before any symptom was recognized.
    NeedSymptoms,
    /// A disease was predicted and doctors looked up.
    Diagnosis {
        disease: String,
        recommendation: String,
        symptoms: Vec<String>,
    },
}

/// Response to one user turn.
#[derive(Debug, Clone, Serialize)]
pub struct TriageReply {
    pub token: SessionToken,
    pub stage: Stage,
    /// Display-ready assistant text.
    pub message: String,
    pub outcome: TurnOutcome,
}
