//! Disease prediction from a collected symptom set.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use triage_core::error::{Result, TriageError};

use crate::loader::ModelHandle;

/// Order-independent document for a symptom set: trimmed names, sorted,
/// deduplicated, joined by single spaces.
pub fn canonical_document<I, S>(symptoms: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symptoms
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Predicts one disease label from matched symptoms using a shared model.
#[derive(Debug, Clone)]
pub struct DiseaseClassifier {
    model: Arc<ModelHandle>,
}

impl DiseaseClassifier {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<ModelHandle> {
        &self.model
    }

    /// Top predicted disease for `symptoms`.
    ///
    /// An empty set is `EmptySymptomSet` and never touches the model.
    pub fn predict_disease<I, S>(&self, symptoms: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let document = canonical_document(symptoms);
        if document.is_empty() {
            return Err(TriageError::EmptySymptomSet);
        }

        let model = self.model.get()?;
        let features = model.vectorizer.transform(&document)?;
        debug!(
            document = %document,
            active_features = features.iter().filter(|&&x| x != 0.0).count(),
            "Symptoms vectorized"
        );

        let disease = model
            .classifier
            .predict(&features)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                TriageError::ModelUnavailable("classifier returned no label".to_string())
            })?;

        info!(disease = %disease, "Disease predicted");
        Ok(disease)
    }
}
