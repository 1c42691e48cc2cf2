//! Batch metrics for aggregation runs

use std::fmt;

/// Identifies the group a skip applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// An age-risk group at one threshold
    AgeThreshold(u8),
    /// A treatment-effect group for (issue id, category label)
    IssueCategory(i64, &'static str),
    /// A timing band, by code
    TimingBand(String),
    /// A scenario cell: (timeframe code, age_min, age_max)
    Scenario(String, u8, u8),
    /// An economic band, by code
    EconomicBand(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::AgeThreshold(t) => write!(f, "age_risk@{}", t),
            GroupKey::IssueCategory(issue, category) => {
                write!(f, "effect@issue:{}/{}", issue, category)
            }
            GroupKey::TimingBand(code) => write!(f, "timing@{}", code),
            GroupKey::Scenario(code, lo, hi) => write!(f, "scenario@{}/{}-{}", code, lo, hi),
            GroupKey::EconomicBand(code) => write!(f, "economic@{}", code),
        }
    }
}

/// Why a group produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Equal counts of increase and decrease findings; excluded rather than
    /// resolved by arbitrary tie-break
    MixedDirection,
    /// No qualifying findings for the group
    InsufficientEvidence,
    /// The group's inputs reference entities that do not exist
    Integrity(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MixedDirection => write!(f, "mixed_direction"),
            SkipReason::InsufficientEvidence => write!(f, "insufficient_evidence"),
            SkipReason::Integrity(detail) => write!(f, "integrity: {}", detail),
        }
    }
}

/// A skipped group with its reason, for the batch report.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGroup {
    /// Which group was skipped
    pub key: GroupKey,
    /// Why
    pub reason: SkipReason,
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    /// Age-risk rows written
    pub age_risk_rows: usize,
    /// Treatment-effect rows written
    pub treatment_effect_rows: usize,
    /// Timing-benefit rows written
    pub timing_rows: usize,
    /// Future-scenario rows written
    pub scenario_rows: usize,
    /// Economic-impact rows written
    pub economic_rows: usize,
    /// Groups that produced no row, with reasons
    pub skipped: Vec<SkippedGroup>,
    /// Whether the run was cancelled before completing
    pub cancelled: bool,
    /// Wall-clock runtime of the batch in seconds
    pub runtime_secs: u64,
}

impl AggregationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows written across all five tables.
    pub fn total_rows(&self) -> usize {
        self.age_risk_rows
            + self.treatment_effect_rows
            + self.timing_rows
            + self.scenario_rows
            + self.economic_rows
    }

    /// Record a skipped group.
    pub fn record_skip(&mut self, key: GroupKey, reason: SkipReason) {
        self.skipped.push(SkippedGroup { key, reason });
    }

    /// Human-readable summary of the run.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Aggregation{}: {} rows ({} age-risk, {} effect, {} timing, {} scenario, {} economic) in {}s",
            if self.cancelled { " (cancelled)" } else { "" },
            self.total_rows(),
            self.age_risk_rows,
            self.treatment_effect_rows,
            self.timing_rows,
            self.scenario_rows,
            self.economic_rows,
            self.runtime_secs,
        );
        if !self.skipped.is_empty() {
            out.push_str(&format!("\nSkipped {} group(s):", self.skipped.len()));
            for skip in &self.skipped {
                out.push_str(&format!("\n  {} ({})", skip.key, skip.reason));
            }
        }
        out
    }
}
