//! Free-text to vocabulary symptom matching.
//!
//! Three passes over the vocabulary, first hit wins:
//!
//! 1. exact equality of compact forms
//! 2. the compact input contains the compact term; the longest such term
//!    wins
//! 3. fuzzy: the highest-scoring entry, if it reaches the threshold
//!
//! Compact forms drop case, punctuation, and whitespace, so "Head ache"
//! matches "headache" in the first pass.

use serde::Serialize;
use tracing::debug;

use triage_core::config::MatcherConfig;
use triage_core::error::{Result, TriageError};

use crate::normalize::compact;
use crate::scoring::{partial_ratio, ratio};

/// Default acceptance threshold for fuzzy matches (0-100).
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Default weight for best-window similarity.
pub const DEFAULT_PARTIAL_SCALE: f64 = 0.9;

/// Which pass produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Contained,
    Fuzzy,
}

/// A vocabulary entry recognized in user text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomMatch {
    /// The vocabulary entry, exactly as stored.
    pub symptom: String,
    /// Similarity on a 0-100 scale; 100 for exact and contained matches.
    pub score: f64,
    pub kind: MatchKind,
}

/// Finds the single best vocabulary entry for a piece of user text.
#[derive(Debug, Clone)]
pub struct SymptomMatcher {
    threshold: f64,
    partial_scale: f64,
}

impl Default for SymptomMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SymptomMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            partial_scale: DEFAULT_PARTIAL_SCALE,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self {
            threshold: config.threshold,
            partial_scale: config.partial_scale,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a compact input against a compact vocabulary term.
    ///
    /// Partial (best-window) similarity only applies when the input is the
    /// longer string, so a short reply like "no" cannot fuzzily hit a long
    /// term that happens to contain it.
    pub fn score(&self, input: &str, term: &str) -> f64 {
        let whole = ratio(input, term);
        if input.chars().count() > term.chars().count() {
            whole.max(partial_ratio(term, input) * self.partial_scale)
        } else {
            whole
        }
    }

    /// Find the best match for `text` in `vocabulary`.
    ///
    /// Returns `Ok(None)` when nothing is recognized, including for empty or
    /// punctuation-only text. An empty vocabulary is `InvalidVocabulary`.
    pub fn match_symptom<S: AsRef<str>>(
        &self,
        text: &str,
        vocabulary: &[S],
    ) -> Result<Option<SymptomMatch>> {
        if vocabulary.is_empty() {
            return Err(TriageError::InvalidVocabulary);
        }

        let input = compact(text);
        if input.is_empty() {
            return Ok(None);
        }

        let terms: Vec<(&str, String)> = vocabulary
            .iter()
            .map(|entry| (entry.as_ref(), compact(entry.as_ref())))
            .filter(|(_, term)| !term.is_empty())
            .collect();

        if let Some((entry, _)) = terms.iter().find(|(_, term)| *term == input) {
            debug!(symptom = entry, "Exact symptom match");
            return Ok(Some(SymptomMatch {
                symptom: entry.to_string(),
                score: 100.0,
                kind: MatchKind::Exact,
            }));
        }

        // Longest contained term wins, so "high fever" beats "fever".
        let mut contained: Option<&(&str, String)> = None;
        for candidate in terms.iter().filter(|(_, term)| input.contains(term.as_str())) {
            let longer = contained
                .map_or(true, |(_, top)| candidate.1.chars().count() > top.chars().count());
            if longer {
                contained = Some(candidate);
            }
        }
        if let Some((entry, _)) = contained {
            debug!(symptom = entry, "Contained symptom match");
            return Ok(Some(SymptomMatch {
                symptom: entry.to_string(),
                score: 100.0,
                kind: MatchKind::Contained,
            }));
        }

        let mut best: Option<(&str, f64)> = None;
        for (entry, term) in &terms {
            let score = self.score(&input, term);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((*entry, score));
            }
        }

        match best {
            Some((entry, score)) if score >= self.threshold => {
                debug!(symptom = entry, score, "Fuzzy symptom match");
                Ok(Some(SymptomMatch {
                    symptom: entry.to_string(),
                    score,
                    kind: MatchKind::Fuzzy,
                }))
            }
            Some((entry, score)) => {
                debug!(
                    nearest = entry,
                    score,
                    threshold = self.threshold,
                    "No symptom above threshold"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Name of the matched symptom only; see [`SymptomMatcher::match_symptom`].
    pub fn extract_symptom<S: AsRef<str>>(
        &self,
        text: &str,
        vocabulary: &[S],
    ) -> Result<Option<String>> {
        Ok(self.match_symptom(text, vocabulary)?.map(|m| m.symptom))
    }
}
