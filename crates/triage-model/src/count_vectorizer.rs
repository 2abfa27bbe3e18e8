//! Bag-of-words count vectorizer loaded from a JSON artifact.
//!
//! Artifact shape:
//!
//! ```json
//! { "vocabulary": { "cough": 0, "high_fever": 1, "runny nose": 2 }, "lowercase": true }
//! ```
//!
//! Tokens are runs of two or more word characters. Vocabulary terms that
//! contain spaces are counted as n-grams of consecutive tokens.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use triage_core::error::{Result, TriageError};

use crate::artifacts::{FeatureVector, Vectorizer};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CountVectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

fn default_lowercase() -> bool {
    true
}

/// Counts vocabulary term occurrences into a fixed-width vector.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    lowercase: bool,
    max_ngram: usize,
}

impl CountVectorizer {
    /// Build from a term-to-column mapping.
    ///
    /// Columns must be exactly `0..vocabulary.len()`, each used once.
    pub fn new(vocabulary: HashMap<String, usize>, lowercase: bool) -> Result<Self> {
        if vocabulary.is_empty() {
            return Err(TriageError::ModelUnavailable(
                "vectorizer vocabulary is empty".to_string(),
            ));
        }
        let mut used = vec![false; vocabulary.len()];
        for (term, &column) in &vocabulary {
            match used.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(TriageError::ModelUnavailable(format!(
                        "vectorizer column {} for '{}' is out of range or duplicated",
                        column, term
                    )))
                }
            }
        }

        let max_ngram = vocabulary
            .keys()
            .map(|term| term.split_whitespace().count().max(1))
            .max()
            .unwrap_or(1);

        Ok(Self {
            vocabulary,
            lowercase,
            max_ngram,
        })
    }

    /// Parse the JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: CountVectorizerArtifact = serde_json::from_str(json)
            .map_err(|e| TriageError::ModelUnavailable(format!("vectorizer artifact: {}", e)))?;
        Self::new(artifact.vocabulary, artifact.lowercase)
    }

    /// Width of the produced feature vectors.
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokens<'a>(&self, document: &'a str) -> Vec<&'a str> {
        TOKEN_PATTERN
            .find_iter(document)
            .map(|m| m.as_str())
            .collect()
    }
}

impl Vectorizer for CountVectorizer {
    fn transform(&self, document: &str) -> Result<FeatureVector> {
        let text = if self.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };
        let tokens = self.tokens(&text);

        let mut features = FeatureVector::zeros(self.dimensions());
        for n in 1..=self.max_ngram {
            for gram in tokens.windows(n) {
                let key = gram.join(" ");
                if let Some(&column) = self.vocabulary.get(&key) {
                    features[column] += 1.0;
                }
            }
        }
        Ok(features)
    }
}
