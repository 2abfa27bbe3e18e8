//! Linear multi-class classifier loaded from a JSON artifact.
//!
//! Artifact shape, one row of `coef` and one `intercept` per class:
//!
//! ```json
//! { "classes": ["Common Cold", "Migraine"],
//!   "coef": [[0.9, 0.1], [0.0, 1.2]],
//!   "intercept": [0.0, -0.1] }
//! ```

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use triage_core::error::{Result, TriageError};

use crate::artifacts::{Classifier, FeatureVector};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearArtifact {
    classes: Vec<String>,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
}

/// Scores each class as `coef · x + intercept`.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<String>,
    coef: Array2<f32>,
    intercept: Array1<f32>,
}

impl LinearClassifier {
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f32>>, intercept: Vec<f32>) -> Result<Self> {
        if classes.is_empty() {
            return Err(unavailable("classifier has no classes".to_string()));
        }
        if coef.len() != classes.len() || intercept.len() != classes.len() {
            return Err(unavailable(format!(
                "classifier shape mismatch: {} classes, {} coef rows, {} intercepts",
                classes.len(),
                coef.len(),
                intercept.len()
            )));
        }
        let width = coef[0].len();
        if width == 0 || coef.iter().any(|row| row.len() != width) {
            return Err(unavailable(
                "classifier coef rows must share a non-zero width".to_string(),
            ));
        }

        let flat: Vec<f32> = coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((classes.len(), width), flat)
            .map_err(|e| unavailable(format!("classifier coef: {}", e)))?;

        Ok(Self {
            classes,
            coef,
            intercept: Array1::from(intercept),
        })
    }

    /// Parse the JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: LinearArtifact = serde_json::from_str(json)
            .map_err(|e| unavailable(format!("classifier artifact: {}", e)))?;
        Self::new(artifact.classes, artifact.coef, artifact.intercept)
    }

    /// Expected feature vector width.
    pub fn features(&self) -> usize {
        self.coef.ncols()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Raw per-class scores.
    pub fn decision_function(&self, features: &FeatureVector) -> Result<Array1<f32>> {
        if features.len() != self.features() {
            return Err(unavailable(format!(
                "feature width {} does not match classifier width {}",
                features.len(),
                self.features()
            )));
        }
        Ok(self.coef.dot(features) + &self.intercept)
    }
}

impl Classifier for LinearClassifier {
    /// Labels ordered by descending score; equal scores keep class order.
    fn predict(&self, features: &FeatureVector) -> Result<Vec<String>> {
        let scores = self.decision_function(features)?;
        let mut ranked: Vec<usize> = (0..self.classes.len()).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        Ok(ranked
            .into_iter()
            .map(|i| self.classes[i].clone())
            .collect())
    }
}

fn unavailable(message: String) -> TriageError {
    TriageError::ModelUnavailable(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn classifier() -> LinearClassifier {
        LinearClassifier::from_json(
            r#"{
                "classes": ["Common Cold", "Migraine", "Malaria"],
                "coef": [[1.0, 0.0, 0.5], [0.0, 1.0, 0.0], [0.5, 0.0, 1.0]],
                "intercept": [0.0, 0.0, 0.75]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_predict_ranks_by_score() {
        let c = classifier();
        let labels = c.predict(&array![0.0, 2.0, 0.0]).unwrap();
        assert_eq!(labels[0], "Migraine");
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_predict_applies_intercept() {
        let c = classifier();
        // Cold scores 1.0; Malaria scores 0.5 + 0.75.
        let labels = c.predict(&array![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(labels, vec!["Malaria", "Common Cold", "Migraine"]);
    }

    #[test]
    fn test_zero_vector_keeps_class_order_on_ties() {
        let c = LinearClassifier::new(
            vec!["A".into(), "B".into()],
            vec![vec![1.0], vec![1.0]],
            vec![0.0, 0.0],
        )
        .unwrap();
        assert_eq!(c.predict(&array![0.0]).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_width_mismatch_is_unavailable() {
        let err = classifier().predict(&array![1.0, 0.0]).unwrap_err();
        assert!(matches!(err, TriageError::ModelUnavailable(_)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(LinearClassifier::new(vec![], vec![], vec![]).is_err());
        assert!(
            LinearClassifier::new(vec!["A".into()], vec![vec![1.0], vec![2.0]], vec![0.0])
                .is_err()
        );
        assert!(LinearClassifier::new(
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0], vec![1.0]],
            vec![0.0, 0.0]
        )
        .is_err());
        assert!(LinearClassifier::new(vec!["A".into()], vec![vec![]], vec![0.0]).is_err());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = LinearClassifier::from_json("{}").unwrap_err();
        assert!(matches!(err, TriageError::ModelUnavailable(_)));
    }
}
