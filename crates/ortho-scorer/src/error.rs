//! Scorer error types

use ortho_domain::IssueId;
use thiserror::Error;

/// Errors that can occur during scoring.
///
/// The validation variants reject a request before any computation; no
/// partial result is produced for them. Everything short of these (missing
/// timing bands, sparse evidence) yields a best-effort result with explicit
/// insufficiency markers instead of an error.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// The selected-issue set was empty
    #[error("No issues selected; at least one issue id is required")]
    EmptyIssueSelection,

    /// The patient age is outside the supported domain
    #[error("Patient age {age} exceeds the supported maximum of {max}")]
    AgeOutOfRange {
        /// Submitted age
        age: u8,
        /// Largest supported age
        max: u8,
    },

    /// A selected issue id does not exist; the whole request is rejected
    #[error("Unknown issue id: {0}")]
    UnknownIssue(IssueId),

    /// Storage layer error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The result bundle could not be serialized for the audit log
    #[error("Report serialization error: {0}")]
    Serialization(String),
}
