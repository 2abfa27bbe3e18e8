//! CLI argument definitions for the triage chat binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use triage_core::config::TriageConfig;

/// Symptom triage assistant: describe symptoms, get a likely disease and
/// doctors to see.
#[derive(Parser, Debug)]
#[command(name = "triage", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory holding symptom, doctor and model files.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Fuzzy match acceptance threshold, 0-100.
    #[arg(short = 't', long = "threshold")]
    pub threshold: Option<f64>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TRIAGE_CONFIG env var > ./triage.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TRIAGE_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("triage.toml")
    }

    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut TriageConfig) {
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(threshold) = self.threshold {
            config.matcher.threshold = threshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let args = CliArgs::parse_from([
            "triage",
            "--config",
            "/etc/triage.toml",
            "-d",
            "/srv/triage",
            "--threshold",
            "72.5",
        ]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/triage.toml"));
        assert_eq!(args.threshold, Some(72.5));
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let args = CliArgs::parse_from(["triage", "--data-dir", "/srv/triage", "-l", "debug"]);
        let mut config = TriageConfig::default();
        args.apply(&mut config);

        assert_eq!(config.general.data_dir, "/srv/triage");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.matcher.threshold, 80.0);
    }

    // Only test that touches TRIAGE_CONFIG; every branch is checked here so
    // parallel tests never race on the variable.
    #[test]
    fn test_config_path_env_var_priority() {
        let bare = CliArgs::parse_from(["triage"]);
        let flagged = CliArgs::parse_from(["triage", "-c", "/etc/triage.toml"]);

        std::env::set_var("TRIAGE_CONFIG", "/opt/triage/custom.toml");
        assert_eq!(bare.resolve_config_path(), PathBuf::from("/opt/triage/custom.toml"));
        assert_eq!(flagged.resolve_config_path(), PathBuf::from("/etc/triage.toml"));

        std::env::remove_var("TRIAGE_CONFIG");
        assert_eq!(bare.resolve_config_path(), PathBuf::from("triage.toml"));
    }
}
