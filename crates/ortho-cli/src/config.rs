//! Configuration management for the CLI.
//!
//! The TOML-facing structs live here; they map onto the engine crates'
//! plain config types, which keeps those crates free of serialization
//! concerns and keeps every tunable in one user-editable file.

use crate::error::{CliError, Result};
use ortho_aggregator::AggregatorConfig;
use ortho_classifier::ClassifierConfig;
use ortho_scorer::ScorerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite evidence store
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Classifier settings
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Aggregator settings
    #[serde(default)]
    pub aggregator: AggregatorSettings,

    /// Scorer settings
    #[serde(default)]
    pub scorer: ScorerSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ortho_evidence.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            classifier: ClassifierSettings::default(),
            aggregator: AggregatorSettings::default(),
            scorer: ScorerSettings::default(),
            settings: Settings::default(),
        }
    }
}

/// Classifier settings (TOML surface of `ClassifierConfig`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Minimum relevance score for an issue to qualify
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
}

fn default_relevance_threshold() -> f64 {
    0.15
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Aggregator settings (TOML surface of `AggregatorConfig` scalars; the
/// band/timeframe tables keep their built-in defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSettings {
    /// Weight for findings without a sample size
    #[serde(default = "default_sample_weight")]
    pub default_sample_weight: f64,

    /// Paper count at which confidence saturates
    #[serde(default = "default_paper_cap")]
    pub confidence_paper_cap: u32,

    /// Minutes between worker cycles
    #[serde(default = "default_worker_interval")]
    pub worker_interval_minutes: u64,
}

fn default_sample_weight() -> f64 {
    1.0
}

fn default_paper_cap() -> u32 {
    10
}

fn default_worker_interval() -> u64 {
    60
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            default_sample_weight: default_sample_weight(),
            confidence_paper_cap: default_paper_cap(),
            worker_interval_minutes: default_worker_interval(),
        }
    }
}

/// Scorer settings (TOML surface of `ScorerConfig` scalars).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerSettings {
    /// Largest accepted patient age
    #[serde(default = "default_max_age")]
    pub max_age: u8,
}

fn default_max_age() -> u8 {
    120
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
        }
    }
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Get the default configuration file path (`~/.ortho/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".ortho").join("config.toml"))
    }

    /// Load configuration from the given path, or from the default path,
    /// falling back to defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist the configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Could not serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Build the classifier config.
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            relevance_threshold: self.classifier.relevance_threshold,
            ..ClassifierConfig::default()
        }
    }

    /// Build the aggregator config.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            default_sample_weight: self.aggregator.default_sample_weight,
            confidence_paper_cap: self.aggregator.confidence_paper_cap,
            ..AggregatorConfig::default()
        }
    }

    /// Build the scorer config.
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig {
            max_age: self.scorer.max_age,
            ..ScorerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.db_path, config.db_path);
        assert_eq!(parsed.classifier.relevance_threshold, 0.15);
        assert_eq!(parsed.aggregator.worker_interval_minutes, 60);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("db_path = \"custom.db\"").unwrap();
        assert_eq!(parsed.db_path, PathBuf::from("custom.db"));
        assert_eq!(parsed.aggregator.default_sample_weight, 1.0);
        assert!(parsed.settings.color);
    }

    #[test]
    fn test_engine_config_mapping() {
        let mut config = Config::default();
        config.classifier.relevance_threshold = 0.3;
        config.aggregator.default_sample_weight = 2.5;
        config.scorer.max_age = 110;

        assert_eq!(config.classifier_config().relevance_threshold, 0.3);
        assert_eq!(config.aggregator_config().default_sample_weight, 2.5);
        assert_eq!(config.scorer_config().max_age, 110);
    }
}
