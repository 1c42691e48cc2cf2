//! OrthoEvidence Necessity Scorer
//!
//! Scores a patient's orthodontic-treatment necessity from the derived
//! evidence tables and the issue base severities, producing a 0-100 score,
//! a ranked list of supporting treatment effects, the timing assessment for
//! the patient's age, applicable future scenarios, and the optional
//! economic projection.
//!
//! Scoring is read-only against the evidence store and safe for any number
//! of concurrent callers. Validation failures (empty selection, malformed
//! age, unknown issue id) reject the whole request before any computation;
//! data sparsity (no timing band covering the age, no age-risk rows at or
//! below it) never fails the request and is reported as explicit
//! insufficiency markers instead.
//!
//! # Examples
//!
//! ```no_run
//! use ortho_scorer::{PatientProfile, Scorer, ScorerConfig};
//! use ortho_domain::IssueId;
//! use ortho_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("ortho_evidence.db")?;
//! let scorer = Scorer::new(ScorerConfig::default());
//!
//! let patient = PatientProfile::new(25, vec![IssueId(1)]);
//! let result = scorer.score(&store, &patient)?;
//! println!("necessity: {}", result.score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod result;
mod scorer;

pub use config::ScorerConfig;
pub use error::ScoreError;
pub use result::{
    EconomicSummary, EvidenceBasis, NecessityResult, RankedEffect, ScenarioSummary,
    ScoreComponents, TimingAssessment, Urgency,
};
pub use scorer::{PatientProfile, Scorer};
