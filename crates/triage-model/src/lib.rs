//! Disease classification from a collected symptom set.
//!
//! A pretrained vectorizer turns a canonical symptom document into a
//! feature vector; a pretrained classifier turns that vector into a disease
//! label. Both come from external artifacts, loaded at most once per
//! [`ModelHandle`] and shared read-only afterwards.

pub mod artifacts;
pub mod classifier;
pub mod count_vectorizer;
pub mod linear;
pub mod loader;

pub use artifacts::{Classifier, FeatureVector, ModelPair, Vectorizer};
pub use classifier::{canonical_document, DiseaseClassifier};
pub use count_vectorizer::CountVectorizer;
pub use linear::LinearClassifier;
pub use loader::{ArtifactLoader, JsonArtifactLoader, ModelHandle};
