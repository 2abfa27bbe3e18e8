//! Reference knowledge for triage: the symptom vocabulary with its fuzzy
//! matcher, and the doctor table behind recommendations.

pub mod doctors;
pub mod matcher;
pub mod normalize;
pub mod scoring;
pub mod vocabulary;

pub use doctors::{DoctorRow, DoctorTable, NO_RECOMMENDATION};
pub use matcher::{MatchKind, SymptomMatch, SymptomMatcher, DEFAULT_THRESHOLD};
pub use vocabulary::SymptomVocabulary;
