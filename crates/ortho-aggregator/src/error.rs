//! Error types for aggregation

use thiserror::Error;

/// Errors that can occur during an aggregation batch
#[derive(Error, Debug)]
pub enum AggregateError {
    /// Storage layer error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Another regeneration run already holds the lock
    #[error("Aggregation is already running")]
    AlreadyRunning,

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
