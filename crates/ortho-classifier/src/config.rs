//! Classifier configuration

use ortho_domain::Language;

/// Configuration for keyword-based classification.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Minimum relevance score for an issue to qualify (exclusive)
    pub relevance_threshold: f64,

    /// Language whose keywords are used when the paper's language has none
    pub fallback_language: Language,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.15,
            fallback_language: Language::En,
        }
    }
}

impl ClassifierConfig {
    /// Stricter threshold: only strongly matching issues qualify.
    pub fn strict() -> Self {
        Self {
            relevance_threshold: 0.35,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(format!(
                "relevance_threshold {} is outside [0, 1]",
                self.relevance_threshold
            ));
        }
        Ok(())
    }
}
