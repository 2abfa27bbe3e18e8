use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TriageError};

/// Top-level configuration for the triage assistant.
///
/// Loaded from a TOML file. Every section is optional and falls back to
/// its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl TriageConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TriageConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist, cannot be parsed, or fails validation.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.matcher.threshold) {
            return Err(TriageError::Config(format!(
                "matcher.threshold must be within 0..=100, got {}",
                self.matcher.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.matcher.partial_scale) {
            return Err(TriageError::Config(format!(
                "matcher.partial_scale must be within 0..=1, got {}",
                self.matcher.partial_scale
            )));
        }
        if self.session.token_bytes == 0 {
            return Err(TriageError::Config(
                "session.token_bytes must be at least 1".to_string(),
            ));
        }
        if self.dialogue.symptoms_for_diagnosis == 0 {
            return Err(TriageError::Config(
                "dialogue.symptoms_for_diagnosis must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a configured file path against `general.data_dir`.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            Path::new(&self.general.data_dir).join(candidate)
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding reference tables and model artifacts.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Session token and message limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Random bytes per session token (16 bytes yields 22 characters).
    pub token_bytes: usize,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_bytes: 16,
            max_message_length: 2000,
        }
    }
}

/// Fuzzy symptom matching tolerances. Scores are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum fuzzy score for a vocabulary entry to be accepted.
    pub threshold: f64,
    /// Weight applied to best-window (partial) similarity.
    pub partial_scale: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            partial_scale: 0.9,
        }
    }
}

/// Pretrained artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub vectorizer_path: String,
    pub classifier_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: "vectorizer.json".to_string(),
            classifier_path: "classifier.json".to_string(),
        }
    }
}

/// Reference table locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// JSON array of known symptom names.
    pub symptoms_path: String,
    /// JSON array of `{ "disease", "doctor" }` rows.
    pub doctors_path: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            symptoms_path: "symptoms.json".to_string(),
            doctors_path: "doctors.json".to_string(),
        }
    }
}

/// When the conversation moves from collecting symptoms to a diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Diagnose automatically once this many distinct symptoms are held.
    pub symptoms_for_diagnosis: usize,
    /// Messages that end symptom collection early.
    pub finish_phrases: Vec<String>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            symptoms_for_diagnosis: 5,
            finish_phrases: vec![
                "done".to_string(),
                "that's all".to_string(),
                "that is all".to_string(),
                "no more".to_string(),
                "nothing else".to_string(),
                "diagnose".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = TriageConfig::default();
        assert_eq!(config.general.data_dir, "data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.session.token_bytes, 16);
        assert_eq!(config.matcher.threshold, 80.0);
        assert_eq!(config.dialogue.symptoms_for_diagnosis, 5);
        assert!(config.dialogue.finish_phrases.contains(&"done".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/srv/triage"
log_level = "debug"

[matcher]
threshold = 72.5

[dialogue]
symptoms_for_diagnosis = 3
finish_phrases = ["finished"]
"#;
        let file = create_temp_config(content);
        let config = TriageConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/srv/triage");
        assert_eq!(config.matcher.threshold, 72.5);
        assert_eq!(config.matcher.partial_scale, 0.9);
        assert_eq!(config.dialogue.symptoms_for_diagnosis, 3);
        assert_eq!(config.dialogue.finish_phrases, vec!["finished".to_string()]);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = TriageConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.session.max_message_length, 2000);
        assert_eq!(config.model.classifier_path, "classifier.json");
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        let file = create_temp_config("[matcher]\nthreshold = 140.0\n");
        let err = TriageConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, TriageError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_token_bytes() {
        let mut config = TriageConfig::default();
        config.session.token_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_symptom_count() {
        let mut config = TriageConfig::default();
        config.dialogue.symptoms_for_diagnosis = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = TriageConfig::load_or_default(Path::new("/nonexistent/triage.toml"));
        assert_eq!(config.general.data_dir, "data");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [valid toml");
        assert!(TriageConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("triage.toml");

        let mut config = TriageConfig::default();
        config.matcher.threshold = 65.0;
        config.save(&path).unwrap();

        let reloaded = TriageConfig::load(&path).unwrap();
        assert_eq!(reloaded.matcher.threshold, 65.0);
        assert_eq!(reloaded.reference.doctors_path, "doctors.json");
    }

    #[test]
    fn test_resolve_path_relative_and_absolute() {
        let config = TriageConfig::default();
        assert_eq!(
            config.resolve_path("symptoms.json"),
            Path::new("data").join("symptoms.json")
        );
        #[cfg(unix)]
        assert_eq!(
            config.resolve_path("/opt/model.json"),
            PathBuf::from("/opt/model.json")
        );
    }
}
