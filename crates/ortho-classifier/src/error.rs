//! Classifier error types

use thiserror::Error;

/// Errors that can occur during classification
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Store error while persisting relations
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
