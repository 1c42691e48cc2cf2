//! Research findings - the fundamental unit of evidence
//!
//! A finding is one risk-or-benefit statement extracted upstream from one
//! paper for one dental issue and age range. Findings are immutable once
//! imported; the engine only reads them.

use crate::age::AgeRange;
use crate::{FindingId, IssueId, PaperId};

/// Whether a finding describes a risk of non-treatment or a benefit of
/// treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingType {
    /// Risk statement (what happens without treatment)
    Risk,
    /// Benefit statement (what treatment achieves)
    Benefit,
}

impl FindingType {
    /// Label as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::Risk => "risk",
            FindingType::Benefit => "benefit",
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "risk" => Some(FindingType::Risk),
            "benefit" => Some(FindingType::Benefit),
            _ => None,
        }
    }
}

/// Direction of a finding's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectDirection {
    /// The measured quantity goes up
    Increase,
    /// The measured quantity goes down
    Decrease,
}

impl EffectDirection {
    /// Label as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectDirection::Increase => "increase",
            EffectDirection::Decrease => "decrease",
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "increase" => Some(EffectDirection::Increase),
            "decrease" => Some(EffectDirection::Decrease),
            _ => None,
        }
    }
}

/// One extracted risk-or-benefit statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchFinding {
    /// Internal row id
    pub id: FindingId,

    /// Source paper
    pub paper_id: PaperId,

    /// Issue the statement is about
    pub issue_id: IssueId,

    /// Risk or benefit
    pub finding_type: FindingType,

    /// Japanese description, verbatim from extraction
    pub description_ja: Option<String>,

    /// Effect magnitude (percentage points)
    pub effect_value: f64,

    /// Direction of the effect
    pub effect_direction: EffectDirection,

    /// Reported confidence interval, verbatim
    pub confidence_interval: Option<String>,

    /// Reported p-value
    pub p_value: Option<f64>,

    /// Applicable age range; unset bounds mean unbounded
    pub age_range: AgeRange,
}

/// A finding prior to insertion (no row id yet).
#[derive(Debug, Clone, PartialEq)]
pub struct NewResearchFinding {
    /// Source paper
    pub paper_id: PaperId,
    /// Issue the statement is about
    pub issue_id: IssueId,
    /// Risk or benefit
    pub finding_type: FindingType,
    /// Japanese description
    pub description_ja: Option<String>,
    /// Effect magnitude (percentage points)
    pub effect_value: f64,
    /// Direction of the effect
    pub effect_direction: EffectDirection,
    /// Reported confidence interval
    pub confidence_interval: Option<String>,
    /// Reported p-value
    pub p_value: Option<f64>,
    /// Applicable age range
    pub age_range: AgeRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_type_roundtrip() {
        assert_eq!(FindingType::parse("risk"), Some(FindingType::Risk));
        assert_eq!(FindingType::parse("Benefit"), Some(FindingType::Benefit));
        assert_eq!(FindingType::parse("neutral"), None);
        assert_eq!(FindingType::Risk.as_str(), "risk");
    }

    #[test]
    fn test_direction_roundtrip() {
        assert_eq!(EffectDirection::parse("increase"), Some(EffectDirection::Increase));
        assert_eq!(EffectDirection::parse("DECREASE"), Some(EffectDirection::Decrease));
        assert_eq!(EffectDirection::parse("flat"), None);
    }
}
