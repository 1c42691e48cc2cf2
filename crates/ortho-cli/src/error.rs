//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] ortho_store::StoreError),

    /// Classifier error
    #[error("Classifier error: {0}")]
    Classifier(#[from] ortho_classifier::ClassifierError),

    /// Aggregation error
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] ortho_aggregator::AggregateError),

    /// Scoring error
    #[error("Scoring error: {0}")]
    Score(#[from] ortho_scorer::ScoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
