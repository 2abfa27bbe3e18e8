//! The controlled list of recognized symptom names.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use triage_core::error::{Result, TriageError};

/// Ordered, non-empty list of known symptom names.
///
/// Order matters: the matcher prefers earlier entries on ties. Entries are
/// stored exactly as supplied; normalization happens only at comparison time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    entries: Vec<String>,
}

impl SymptomVocabulary {
    /// Build a vocabulary. Blank entries and repeats are dropped, keeping the
    /// first occurrence; nothing left is `InvalidVocabulary`.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let entries: Vec<String> = entries
            .into_iter()
            .map(Into::into)
            .filter(|e| !e.trim().is_empty())
            .filter(|e| seen.insert(e.clone()))
            .collect();

        if entries.is_empty() {
            return Err(TriageError::InvalidVocabulary);
        }
        Ok(Self { entries })
    }

    /// Load a JSON array of symptom names.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            TriageError::ReferenceData(format!("{}: {}", path.display(), e))
        })?;
        let vocabulary = Self::new(entries)?;
        info!(
            path = %path.display(),
            symptoms = vocabulary.len(),
            "Symptom vocabulary loaded"
        );
        Ok(vocabulary)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.entries.iter().any(|e| e == symptom)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AsRef<[String]> for SymptomVocabulary {
    fn as_ref(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_keeps_order() {
        let vocab = SymptomVocabulary::new(["fever", "cough", "headache"]).unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["fever", "cough", "headache"]);
        assert!(vocab.contains("cough"));
        assert!(!vocab.contains("Cough"));
    }

    #[test]
    fn test_new_drops_duplicates_and_blanks() {
        let vocab = SymptomVocabulary::new(["fever", " ", "cough", "fever"]).unwrap();
        assert_eq!(vocab.as_slice(), ["fever".to_string(), "cough".to_string()]);
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let err = SymptomVocabulary::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, TriageError::InvalidVocabulary));
        let err = SymptomVocabulary::new(["", "  "]).unwrap_err();
        assert!(matches!(err, TriageError::InvalidVocabulary));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"["itching", "skin_rash", "continuous_sneezing"]"#)
            .unwrap();
        let vocab = SymptomVocabulary::from_json_file(file.path()).unwrap();
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("skin_rash"));
    }

    #[test]
    fn test_from_json_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"symptoms": 3}"#).unwrap();
        let err = SymptomVocabulary::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, TriageError::ReferenceData(_)));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = SymptomVocabulary::from_json_file(Path::new("/nonexistent/symptoms.json"))
            .unwrap_err();
        assert!(matches!(err, TriageError::Io(_)));
    }
}
