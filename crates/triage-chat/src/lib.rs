//! Conversational triage: collects symptoms per session, then diagnoses
//! and recommends doctors.

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod types;

pub use error::ChatError;
pub use orchestrator::TriageOrchestrator;
pub use policy::{validate_transition, DialoguePolicy};
pub use types::{TriageReply, TurnOutcome};
