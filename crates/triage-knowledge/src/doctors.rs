//! Doctor reference table and recommendation text.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use triage_core::error::{Result, TriageError};

/// Reply when the table has no doctors for a disease.
pub const NO_RECOMMENDATION: &str = "No doctor recommendations available for this disease.";

const RECOMMENDATION_PREFIX: &str = "Recommended doctors: ";

/// One row of the doctor dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRow {
    pub disease: String,
    pub doctor: String,
}

/// Read-only mapping from disease name to doctor descriptors.
///
/// Lookup is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct DoctorTable {
    by_disease: HashMap<String, Vec<String>>,
}

impl DoctorTable {
    /// Group rows by disease, keeping row order within each disease.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = DoctorRow>,
    {
        let mut by_disease: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            by_disease.entry(row.disease).or_default().push(row.doctor);
        }
        Self { by_disease }
    }

    /// Load a JSON array of `{ "disease": ..., "doctor": ... }` rows.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rows: Vec<DoctorRow> = serde_json::from_str(&content).map_err(|e| {
            TriageError::ReferenceData(format!("{}: {}", path.display(), e))
        })?;
        let row_count = rows.len();
        let table = Self::from_rows(rows);
        info!(
            path = %path.display(),
            rows = row_count,
            diseases = table.len(),
            "Doctor table loaded"
        );
        Ok(table)
    }

    /// Doctor descriptors for a disease, if any.
    pub fn doctors_for(&self, disease: &str) -> Option<&[String]> {
        self.by_disease
            .get(disease)
            .map(Vec::as_slice)
            .filter(|doctors| !doctors.is_empty())
    }

    /// Display-ready recommendation for a predicted disease.
    pub fn recommend(&self, disease: &str) -> String {
        match self.doctors_for(disease) {
            Some(doctors) => {
                debug!(disease, doctors = doctors.len(), "Doctors found");
                format!("{}{}", RECOMMENDATION_PREFIX, doctors.join(", "))
            }
            None => {
                debug!(disease, "No doctors listed");
                NO_RECOMMENDATION.to_string()
            }
        }
    }

    /// Number of distinct diseases.
    pub fn len(&self) -> usize {
        self.by_disease.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_disease.is_empty()
    }
}
