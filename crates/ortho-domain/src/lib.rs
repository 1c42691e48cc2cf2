//! OrthoEvidence Domain Layer
//!
//! This crate contains the core domain model for the orthodontic evidence
//! engine. It defines the base entities imported from the literature pipeline
//! (papers, dental issues, keywords, findings), the derived evidence tables
//! regenerated by the aggregator, and the trait interfaces that all other
//! layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Paper**: one ingested research paper with bibliographic metadata and
//!   an ordinal evidence level (1a strongest … 5 weakest)
//! - **ResearchFinding**: a single risk-or-benefit statement extracted from
//!   one paper for one dental issue and age range
//! - **Derived tables**: evidence tables computed from findings, fully
//!   replaceable on re-run, each carrying its contributing source set and a
//!   derived confidence
//! - **SourceSet**: typed ordered set of contributing paper ids, preserved
//!   verbatim for audit
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure business logic only (the single `uuid` dependency provides report
//!   identifiers)
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod age;
pub mod confidence;
pub mod derived;
pub mod finding;
pub mod issue;
pub mod paper;
pub mod relation;
pub mod report;
pub mod source_set;
pub mod traits;

// Re-exports for convenience
pub use age::{AgeBand, AgeRange, Timeframe};
pub use confidence::{evidence_confidence, Confidence};
pub use derived::{
    AgeRiskProfile, AgeTimingBenefit, EconomicImpact, EffectCategory, FutureScenario,
    IssueTreatmentEffect, RecommendationLevel, RiskType,
};
pub use finding::{EffectDirection, FindingType, NewResearchFinding, ResearchFinding};
pub use issue::{DentalIssue, IssueKeyword, Language, NewDentalIssue};
pub use paper::{EvidenceLevel, NewPaper, Paper};
pub use relation::PaperIssueRelation;
pub use report::{ReportId, UserReport};
pub use source_set::SourceSet;

use std::fmt;

/// Row identifier for an ingested research paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaperId(pub i64);

/// Row identifier for a dental issue (stable reference data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IssueId(pub i64);

/// Row identifier for a research finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindingId(pub i64);

impl PaperId {
    /// Get the raw row id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl IssueId {
    /// Get the raw row id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FindingId {
    /// Get the raw row id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
