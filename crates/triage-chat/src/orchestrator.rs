//! Triage orchestrator: wires sessions, symptom matching, classification
//! and doctor lookup into a per-session conversation.
//!
//! Every turn holds its session's record lock from start to finish, so
//! concurrent requests carrying the same token are applied one at a time.
//! Requests for different tokens proceed in parallel.

use std::sync::Arc;

use tracing::{debug, info, warn};

use triage_core::config::TriageConfig;
use triage_core::error::TriageError;
use triage_core::types::{ChatMessage, SessionToken, Stage};
use triage_knowledge::{DoctorTable, SymptomMatcher, SymptomVocabulary};
use triage_model::DiseaseClassifier;
use triage_session::{lock_record, SessionRecord, SessionStore};

use crate::error::ChatError;
use crate::policy::{validate_transition, DialoguePolicy};
use crate::types::{TriageReply, TurnOutcome};

const GREETING: &str = "Hello! Tell me about a symptom you are experiencing, one at a time. \
     Say 'done' when you have listed them all.";

const NO_MATCH_REPLY: &str =
    "I couldn't recognize a symptom in that. Could you describe it differently?";

const NEED_SYMPTOMS_REPLY: &str =
    "Please describe at least one symptom before I can suggest a diagnosis.";

/// Central coordinator for triage conversations.
pub struct TriageOrchestrator {
    store: Arc<SessionStore>,
    vocabulary: Arc<SymptomVocabulary>,
    matcher: SymptomMatcher,
    classifier: DiseaseClassifier,
    doctors: Arc<DoctorTable>,
    policy: DialoguePolicy,
    max_message_length: usize,
}

impl TriageOrchestrator {
    /// Build an orchestrator from configuration and its collaborators.
    pub fn new(
        config: &TriageConfig,
        store: Arc<SessionStore>,
        vocabulary: Arc<SymptomVocabulary>,
        classifier: DiseaseClassifier,
        doctors: Arc<DoctorTable>,
    ) -> Self {
        Self {
            store,
            vocabulary,
            matcher: SymptomMatcher::from_config(&config.matcher),
            classifier,
            doctors,
            policy: DialoguePolicy::from_config(&config.dialogue),
            max_message_length: config.session.max_message_length,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// First contact: open a session and prompt for symptoms.
    pub fn start_session(&self) -> Result<TriageReply, ChatError> {
        let token = self.store.create_session()?;
        let handle = self.store.session(token.as_str())?;
        let mut record = lock_record(&handle)?;
        record.history.push(ChatMessage::assistant(GREETING));

        Ok(TriageReply {
            stage: record.stage,
            token,
            message: GREETING.to_string(),
            outcome: TurnOutcome::Greeting,
        })
    }

    /// Handle one user message.
    ///
    /// Without a token a new session is opened and the message is processed
    /// in it; if that turn fails the new session is discarded, since the
    /// caller never receives its token. An unknown token is
    /// `InvalidSession`; the caller must start over.
    pub fn handle_message(
        &self,
        token: Option<&str>,
        message: &str,
    ) -> Result<TriageReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let opened = token.is_none();
        let token = match token {
            Some(t) => SessionToken::new(t),
            None => self.store.create_session()?,
        };
        let handle = self.store.session(token.as_str())?;
        let mut record = lock_record(&handle)?;

        record.history.push(ChatMessage::user(message));
        let (outcome, reply) = match self.process_turn(&mut record, message) {
            Ok(turn) => turn,
            Err(e) => {
                warn!(session = token.redacted(), error = %e, "Turn failed");
                drop(record);
                if opened {
                    self.discard(&token);
                }
                return Err(e);
            }
        };
        record.history.push(ChatMessage::assistant(reply.clone()));

        Ok(TriageReply {
            stage: record.stage,
            token,
            message: reply,
            outcome,
        })
    }

    /// Transcript of a session, oldest first.
    pub fn history(&self, token: &str) -> Result<Vec<ChatMessage>, ChatError> {
        let handle = self.store.session(token)?;
        let record = lock_record(&handle)?;
        Ok(record.history.clone())
    }

    /// Symptoms held for the current diagnostic cycle, sorted.
    pub fn symptoms(&self, token: &str) -> Result<Vec<String>, ChatError> {
        let handle = self.store.session(token)?;
        let record = lock_record(&handle)?;
        Ok(record.symptoms.iter().cloned().collect())
    }

    pub fn stage(&self, token: &str) -> Result<Stage, ChatError> {
        Ok(self.store.get_stage(token)?)
    }

    /// Forget a session.
    pub fn end_session(&self, token: &str) -> Result<(), ChatError> {
        if self.store.remove_session(token)? {
            Ok(())
        } else {
            Err(TriageError::InvalidSession(SessionToken::new(token).redacted().to_string()).into())
        }
    }

    /// Drop all sessions.
    pub fn shutdown(&self) -> Result<(), ChatError> {
        Ok(self.store.clear()?)
    }

    // -- Private helpers --

    fn discard(&self, token: &SessionToken) {
        match self.store.remove_session(token.as_str()) {
            Ok(_) => debug!(session = token.redacted(), "Discarded unreachable session"),
            Err(e) => warn!(session = token.redacted(), error = %e, "Session cleanup failed"),
        }
    }

    fn process_turn(
        &self,
        record: &mut SessionRecord,
        message: &str,
    ) -> Result<(TurnOutcome, String), ChatError> {
        if record.stage == Stage::Diagnosed {
            debug!("Starting a new diagnostic cycle");
            record.reset();
        }

        if self.policy.is_finish_cue(message) {
            if record.symptoms.is_empty() {
                return Ok((TurnOutcome::NeedSymptoms, NEED_SYMPTOMS_REPLY.to_string()));
            }
            return self.diagnose(record);
        }

        let Some(found) = self
            .matcher
            .match_symptom(message, self.vocabulary.as_slice())?
        else {
            return Ok((TurnOutcome::NoMatch, NO_MATCH_REPLY.to_string()));
        };

        let symptom = found.symptom;
        let added = record.symptoms.insert(symptom.clone());
        if record.stage == Stage::New {
            transition(record, Stage::Collecting)?;
        }

        if !added {
            let reply = format!(
                "I already have {} noted. Any other symptoms? Say 'done' when you are finished.",
                display_name(&symptom)
            );
            return Ok((TurnOutcome::AlreadyRecorded { symptom }, reply));
        }

        let total = record.symptoms.len();
        debug!(symptom = %symptom, total, score = found.score, "Symptom recorded");

        if self.policy.should_diagnose(total) {
            return self.diagnose(record);
        }

        let reply = format!(
            "Noted: {}. Any other symptoms? Say 'done' when you are finished.",
            display_name(&symptom)
        );
        Ok((TurnOutcome::SymptomRecorded { symptom, total }, reply))
    }

    fn diagnose(&self, record: &mut SessionRecord) -> Result<(TurnOutcome, String), ChatError> {
        let disease = self.classifier.predict_disease(&record.symptoms)?;
        let recommendation = self.doctors.recommend(&disease);
        transition(record, Stage::Diagnosed)?;

        let symptoms: Vec<String> = record.symptoms.iter().cloned().collect();
        info!(
            disease = %disease,
            symptoms = symptoms.len(),
            "Diagnosis issued"
        );

        let reply = format!(
            "Based on your symptoms, you may have {}. {}",
            disease, recommendation
        );
        Ok((
            TurnOutcome::Diagnosis {
                disease,
                recommendation,
                symptoms,
            },
            reply,
        ))
    }
}

fn transition(record: &mut SessionRecord, to: Stage) -> Result<(), ChatError> {
    validate_transition(record.stage, to)?;
    record.advance(to)?;
    Ok(())
}

/// Vocabulary entries may use underscores ("skin_rash").
fn display_name(symptom: &str) -> String {
    symptom.replace('_', " ")
}

// =============================================================================
// Tests
// =============================================================================
