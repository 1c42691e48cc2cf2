//! Trait definitions for external interactions
//!
//! These traits define the boundary between domain logic and infrastructure.
//! Infrastructure implementations live in other crates (ortho-store).

use crate::age::AgeBand;
use crate::derived::{
    AgeRiskProfile, AgeTimingBenefit, EconomicImpact, FutureScenario, IssueTreatmentEffect,
};
use crate::finding::{NewResearchFinding, ResearchFinding};
use crate::issue::{DentalIssue, IssueKeyword, NewDentalIssue};
use crate::paper::{NewPaper, Paper};
use crate::relation::PaperIssueRelation;
use crate::report::{ReportId, UserReport};
use crate::{FindingId, IssueId, PaperId};

/// Typed read/write access to the evidence store.
///
/// Base entities (papers, issues, keywords, findings) are written once by
/// ingestion and read by the engine. Relation and derived-table writes are
/// keyed upserts so that re-running classification or aggregation is
/// idempotent: a second run with unchanged inputs leaves rows byte-identical
/// and never accumulates duplicates. Each upsert is atomic per row, which is
/// what lets read-only scoring run concurrently with a regeneration batch.
pub trait EvidenceStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    // --- papers ---

    /// Insert a paper. If a paper with the same DOI already exists, the
    /// existing id is returned and the record is left untouched.
    fn insert_paper(&mut self, paper: NewPaper) -> Result<PaperId, Self::Error>;

    /// Get a paper by id.
    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error>;

    /// Look a paper up by DOI.
    fn find_paper_by_doi(&self, doi: &str) -> Result<Option<Paper>, Self::Error>;

    /// List all papers in id order.
    fn list_papers(&self) -> Result<Vec<Paper>, Self::Error>;

    // --- issues & keywords ---

    /// Insert a dental issue (append-only reference data).
    fn insert_issue(&mut self, issue: NewDentalIssue) -> Result<IssueId, Self::Error>;

    /// Get an issue by id.
    fn get_issue(&self, id: IssueId) -> Result<Option<DentalIssue>, Self::Error>;

    /// Look an issue up by its stable code.
    fn find_issue_by_code(&self, code: &str) -> Result<Option<DentalIssue>, Self::Error>;

    /// List all issues in id (creation) order.
    fn list_issues(&self) -> Result<Vec<DentalIssue>, Self::Error>;

    /// Upsert a classification keyword, keyed by (issue, keyword, language).
    fn upsert_keyword(&mut self, keyword: IssueKeyword) -> Result<(), Self::Error>;

    /// List all classification keywords.
    fn list_keywords(&self) -> Result<Vec<IssueKeyword>, Self::Error>;

    // --- findings ---

    /// Insert a research finding.
    fn insert_finding(&mut self, finding: NewResearchFinding) -> Result<FindingId, Self::Error>;

    /// List all findings in id order.
    fn list_findings(&self) -> Result<Vec<ResearchFinding>, Self::Error>;

    /// List findings for one issue.
    fn findings_for_issue(&self, issue: IssueId) -> Result<Vec<ResearchFinding>, Self::Error>;

    // --- paper-issue relations ---

    /// Replace a paper's relation rows with the given set.
    ///
    /// Rows are upserted keyed by (paper, issue) and rows for issues absent
    /// from `relations` are removed, so the post-condition is exactly one
    /// row per (paper, issue) regardless of how often classification runs.
    fn replace_paper_relations(
        &mut self,
        paper: PaperId,
        relations: &[PaperIssueRelation],
    ) -> Result<(), Self::Error>;

    /// List a paper's relation rows.
    fn relations_for_paper(&self, paper: PaperId) -> Result<Vec<PaperIssueRelation>, Self::Error>;

    // --- derived tables (aggregator writes, scorer reads) ---

    /// Upsert an age-risk row keyed by (age_threshold, risk_type).
    fn upsert_age_risk_profile(&mut self, row: &AgeRiskProfile) -> Result<(), Self::Error>;

    /// Upsert a treatment-effect row keyed by (issue, effect_category).
    fn upsert_treatment_effect(&mut self, row: &IssueTreatmentEffect) -> Result<(), Self::Error>;

    /// Upsert a timing-benefit row keyed by band code.
    fn upsert_timing_benefit(&mut self, row: &AgeTimingBenefit) -> Result<(), Self::Error>;

    /// Upsert a future-scenario row keyed by (timeframe, age_min, age_max).
    fn upsert_future_scenario(&mut self, row: &FutureScenario) -> Result<(), Self::Error>;

    /// Upsert an economic-impact row keyed by band code.
    fn upsert_economic_impact(&mut self, row: &EconomicImpact) -> Result<(), Self::Error>;

    /// All age-risk rows, ordered by (threshold, risk type).
    fn age_risk_profiles(&self) -> Result<Vec<AgeRiskProfile>, Self::Error>;

    /// Treatment-effect rows for one issue, strongest effect first.
    fn treatment_effects_for_issue(
        &self,
        issue: IssueId,
    ) -> Result<Vec<IssueTreatmentEffect>, Self::Error>;

    /// All timing-benefit rows, ordered by band lower bound.
    fn timing_benefits(&self) -> Result<Vec<AgeTimingBenefit>, Self::Error>;

    /// All future scenarios, ordered by (horizon, age range).
    fn list_scenarios(&self) -> Result<Vec<FutureScenario>, Self::Error>;

    /// Future scenarios whose age range contains `age`, ordered by horizon.
    fn scenarios_for_age(&self, age: u8) -> Result<Vec<FutureScenario>, Self::Error>;

    /// All economic-impact rows, ordered by band lower bound.
    fn economic_impacts(&self) -> Result<Vec<EconomicImpact>, Self::Error>;

    /// The economic-impact row whose band contains `age`, if any.
    fn economic_impact_for_age(&self, age: u8) -> Result<Option<EconomicImpact>, Self::Error>;

    // --- audit log ---

    /// Append a scoring report to the audit log. Reports are never updated
    /// or deleted.
    fn append_report(&mut self, report: &UserReport) -> Result<ReportId, Self::Error>;

    /// List all reports, oldest first.
    fn list_reports(&self) -> Result<Vec<UserReport>, Self::Error>;
}

/// Convenience: the timing-benefit row whose band contains `age`.
///
/// Provided here because the lookup is pure given `timing_benefits`; bands
/// are validated non-overlapping at write time, so at most one row matches.
pub fn timing_benefit_for_age<S: EvidenceStore>(
    store: &S,
    age: u8,
) -> Result<Option<AgeTimingBenefit>, S::Error> {
    let rows = store.timing_benefits()?;
    Ok(rows.into_iter().find(|row| row.band.contains(age)))
}

/// Validate that a set of age bands is non-overlapping.
///
/// Returns the first overlapping pair of band codes, if any. Gaps are legal
/// (the scorer reports them as missing timing data), overlaps are not.
pub fn find_band_overlap(bands: &[AgeBand]) -> Option<(String, String)> {
    let mut sorted: Vec<&AgeBand> = bands.iter().collect();
    sorted.sort_by_key(|b| b.age_min);
    for pair in sorted.windows(2) {
        if pair[1].age_min <= pair[0].age_max {
            return Some((pair[0].code.clone(), pair[1].code.clone()));
        }
    }
    None
}
