//! Capability traits for pretrained artifacts.

use triage_core::error::Result;

/// Dense feature vector produced by a [`Vectorizer`].
pub type FeatureVector = ndarray::Array1<f32>;

/// Maps a symptom document to a feature vector.
pub trait Vectorizer: Send + Sync {
    fn transform(&self, document: &str) -> Result<FeatureVector>;
}

/// Maps a feature vector to ranked disease labels, best first.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Vec<String>>;
}

/// A vectorizer and the classifier trained on its output.
pub struct ModelPair {
    pub vectorizer: Box<dyn Vectorizer>,
    pub classifier: Box<dyn Classifier>,
}

impl ModelPair {
    pub fn new(
        vectorizer: impl Vectorizer + 'static,
        classifier: impl Classifier + 'static,
    ) -> Self {
        Self {
            vectorizer: Box::new(vectorizer),
            classifier: Box::new(classifier),
        }
    }
}

impl std::fmt::Debug for ModelPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPair").finish_non_exhaustive()
    }
}
