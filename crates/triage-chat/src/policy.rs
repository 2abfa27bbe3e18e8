//! Dialogue policy and stage transition rules.
//!
//! Allowed transitions within one diagnostic cycle:
//! New -> Collecting -> Collecting ... -> Diagnosed
//!
//! Diagnosed -> New happens only through an explicit session reset.

use triage_core::config::DialogueConfig;
use triage_core::types::Stage;
use triage_knowledge::normalize::normalize;

use crate::error::ChatError;

/// Validate a stage change requested by the orchestrator.
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), ChatError> {
    let valid = matches!(
        (from, to),
        (Stage::New, Stage::Collecting)
            | (Stage::Collecting, Stage::Collecting)
            | (Stage::Collecting, Stage::Diagnosed)
    );

    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidTransition(from, to))
    }
}

/// Decides when symptom collection ends.
///
/// Diagnosis runs when the user sends a finish phrase with at least one
/// symptom held, or as soon as `symptoms_for_diagnosis` symptoms are held.
#[derive(Debug, Clone)]
pub struct DialoguePolicy {
    symptoms_for_diagnosis: usize,
    finish_phrases: Vec<String>,
}

impl Default for DialoguePolicy {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl DialoguePolicy {
    pub fn new<I, S>(symptoms_for_diagnosis: usize, finish_phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symptoms_for_diagnosis: symptoms_for_diagnosis.max(1),
            finish_phrases: finish_phrases
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(config.symptoms_for_diagnosis, &config.finish_phrases)
    }

    pub fn symptoms_for_diagnosis(&self) -> usize {
        self.symptoms_for_diagnosis
    }

    /// Whether the whole message is a finish phrase, ignoring case and
    /// punctuation.
    pub fn is_finish_cue(&self, message: &str) -> bool {
        let message = normalize(message);
        self.finish_phrases.iter().any(|p| *p == message)
    }

    pub fn should_diagnose(&self, symptom_count: usize) -> bool {
        symptom_count >= self.symptoms_for_diagnosis
    }
}
