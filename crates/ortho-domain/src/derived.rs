//! Derived evidence tables
//!
//! Rows in these tables are regenerated by the aggregator, never imported.
//! Each row carries `calculated_from` (the exact contributing paper set) and
//! a `confidence` derived from those papers' evidence levels. Rows are fully
//! replaceable: regeneration upserts by the table's unique key.

use crate::age::{AgeBand, Timeframe};
use crate::confidence::Confidence;
use crate::finding::EffectDirection;
use crate::source_set::SourceSet;
use crate::IssueId;
use std::collections::BTreeSet;

/// Category of long-term risk tracked by the age-risk table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskType {
    /// Tooth loss
    ToothLoss,
    /// Periodontal disease
    Periodontal,
    /// Temporomandibular joint disorder
    Tmj,
    /// Masticatory function decline
    Mastication,
    /// Speech impairment
    Speech,
}

impl RiskType {
    /// Label as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskType::ToothLoss => "tooth_loss",
            RiskType::Periodontal => "periodontal",
            RiskType::Tmj => "tmj",
            RiskType::Mastication => "mastication",
            RiskType::Speech => "speech",
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tooth_loss" => Some(RiskType::ToothLoss),
            "periodontal" => Some(RiskType::Periodontal),
            "tmj" => Some(RiskType::Tmj),
            "mastication" => Some(RiskType::Mastication),
            "speech" => Some(RiskType::Speech),
            _ => None,
        }
    }
}

/// Category of treatment effect tracked by the issue-treatment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectCategory {
    /// Caries (tooth decay) risk
    CariesRisk,
    /// Periodontal disease risk
    PeriodontalRisk,
    /// Temporomandibular joint disorder risk
    TmjRisk,
    /// Masticatory efficiency
    Mastication,
    /// Aesthetics
    Aesthetic,
    /// Pronunciation / speech
    Pronunciation,
    /// Dental trauma risk
    TraumaRisk,
    /// Uncategorized oral-health effect
    Other,
}

impl EffectCategory {
    /// Label as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectCategory::CariesRisk => "caries_risk",
            EffectCategory::PeriodontalRisk => "periodontal_risk",
            EffectCategory::TmjRisk => "tmj_risk",
            EffectCategory::Mastication => "mastication",
            EffectCategory::Aesthetic => "aesthetic",
            EffectCategory::Pronunciation => "pronunciation",
            EffectCategory::TraumaRisk => "trauma_risk",
            EffectCategory::Other => "other",
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "caries_risk" => Some(EffectCategory::CariesRisk),
            "periodontal_risk" => Some(EffectCategory::PeriodontalRisk),
            "tmj_risk" => Some(EffectCategory::TmjRisk),
            "mastication" => Some(EffectCategory::Mastication),
            "aesthetic" => Some(EffectCategory::Aesthetic),
            "pronunciation" => Some(EffectCategory::Pronunciation),
            "trauma_risk" => Some(EffectCategory::TraumaRisk),
            "other" => Some(EffectCategory::Other),
            _ => None,
        }
    }

    /// All categories.
    pub const ALL: [EffectCategory; 8] = [
        EffectCategory::CariesRisk,
        EffectCategory::PeriodontalRisk,
        EffectCategory::TmjRisk,
        EffectCategory::Mastication,
        EffectCategory::Aesthetic,
        EffectCategory::Pronunciation,
        EffectCategory::TraumaRisk,
        EffectCategory::Other,
    ];
}

/// Recommendation strength attached to a timing band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationLevel {
    /// 最適 - the ideal window
    Optimal,
    /// 推奨 - recommended
    Recommended,
    /// 適応 - suitable
    Suitable,
    /// 条件付き推奨 - conditionally recommended
    Conditional,
    /// 専門医評価必須 - specialist evaluation required
    SpecialistReview,
}

impl RecommendationLevel {
    /// Label as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLevel::Optimal => "optimal",
            RecommendationLevel::Recommended => "recommended",
            RecommendationLevel::Suitable => "suitable",
            RecommendationLevel::Conditional => "conditional",
            RecommendationLevel::SpecialistReview => "specialist_review",
        }
    }

    /// Japanese display label.
    pub fn label_ja(&self) -> &'static str {
        match self {
            RecommendationLevel::Optimal => "最適",
            RecommendationLevel::Recommended => "推奨",
            RecommendationLevel::Suitable => "適応",
            RecommendationLevel::Conditional => "条件付き推奨",
            RecommendationLevel::SpecialistReview => "専門医評価必須",
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optimal" => Some(RecommendationLevel::Optimal),
            "recommended" => Some(RecommendationLevel::Recommended),
            "suitable" => Some(RecommendationLevel::Suitable),
            "conditional" => Some(RecommendationLevel::Conditional),
            "specialist_review" => Some(RecommendationLevel::SpecialistReview),
            _ => None,
        }
    }
}

/// Pooled risk for patients who remain untreated past an age threshold.
///
/// Unique per (age_threshold, risk_type).
#[derive(Debug, Clone, PartialEq)]
pub struct AgeRiskProfile {
    /// Age threshold the risk applies beyond
    pub age_threshold: u8,
    /// Category of risk
    pub risk_type: RiskType,
    /// Pooled risk magnitude (percentage points)
    pub risk_value: f64,
    /// Japanese narrative
    pub description_ja: String,
    /// Contributing papers
    pub calculated_from: SourceSet,
    /// Derived confidence
    pub confidence: Confidence,
}

/// Pooled treatment effect for one issue and effect category.
///
/// Unique per (issue, effect_category).
#[derive(Debug, Clone, PartialEq)]
pub struct IssueTreatmentEffect {
    /// Issue the effect applies to
    pub issue_id: IssueId,
    /// Effect category
    pub effect_category: EffectCategory,
    /// Pooled effect magnitude (percentage points, always >= 0)
    pub effect_value: f64,
    /// Majority direction of the pooled findings
    pub effect_direction: EffectDirection,
    /// Japanese narrative
    pub description_ja: String,
    /// Contributing papers
    pub calculated_from: SourceSet,
    /// Derived confidence
    pub confidence: Confidence,
}

/// Treatment-timing assessment for one age band.
///
/// Unique per band code. Bands must be non-overlapping; an age covered by no
/// band is reported as missing timing data by the scorer, never silently
/// mapped to a neighbor.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeTimingBenefit {
    /// The age band
    pub band: AgeBand,
    /// Japanese narrative of the band's treatment benefits
    pub benefit_text_ja: String,
    /// Recommendation strength
    pub recommendation_level: RecommendationLevel,
    /// Timing score in [0, 100], higher = better window
    pub timing_score: f64,
    /// Contributing papers
    pub calculated_from: SourceSet,
    /// Derived confidence
    pub confidence: Confidence,
}

/// Paired with/without-treatment projection.
///
/// Unique per (timeframe, age_min, age_max).
#[derive(Debug, Clone, PartialEq)]
pub struct FutureScenario {
    /// Projection horizon
    pub timeframe: Timeframe,
    /// Inclusive lower bound of the applicable age range
    pub age_min: u8,
    /// Inclusive upper bound of the applicable age range
    pub age_max: u8,
    /// Japanese narrative with treatment
    pub with_treatment_ja: String,
    /// Japanese narrative without treatment
    pub without_treatment_ja: String,
    /// Issues the scenario applies to; `None` means all issues
    pub issue_ids: Option<BTreeSet<IssueId>>,
    /// Contributing papers
    pub calculated_from: SourceSet,
    /// Derived confidence
    pub confidence: Confidence,
}

impl FutureScenario {
    /// Whether this scenario applies to the given issue selection.
    ///
    /// A scenario with no issue set applies to every selection; otherwise
    /// the sets must intersect.
    pub fn applies_to_issues(&self, selected: &BTreeSet<IssueId>) -> bool {
        match &self.issue_ids {
            None => true,
            Some(ids) => ids.iter().any(|id| selected.contains(id)),
        }
    }
}

/// Economic projection for one age band.
///
/// Unique per band code.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicImpact {
    /// The age band
    pub band: AgeBand,
    /// Present treatment cost (JPY)
    pub current_cost: i64,
    /// Projected lifetime savings (JPY)
    pub future_savings: i64,
    /// Return on investment in percent
    pub roi_percent: f64,
    /// Basis of the calculation, e.g. "医療費削減推計"
    pub calculation_basis: String,
    /// Contributing papers
    pub calculated_from: SourceSet,
    /// Derived confidence
    pub confidence: Confidence,
}

impl EconomicImpact {
    /// Savings net of the present cost.
    pub fn net_benefit(&self) -> i64 {
        self.future_savings - self.current_cost
    }

    /// Savings expressed per month over a 30-year horizon.
    pub fn monthly_benefit(&self) -> i64 {
        self.future_savings / (30 * 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrips() {
        for cat in EffectCategory::ALL {
            assert_eq!(EffectCategory::parse(cat.as_str()), Some(cat));
        }
        for risk in [
            RiskType::ToothLoss,
            RiskType::Periodontal,
            RiskType::Tmj,
            RiskType::Mastication,
            RiskType::Speech,
        ] {
            assert_eq!(RiskType::parse(risk.as_str()), Some(risk));
        }
        for level in [
            RecommendationLevel::Optimal,
            RecommendationLevel::Recommended,
            RecommendationLevel::Suitable,
            RecommendationLevel::Conditional,
            RecommendationLevel::SpecialistReview,
        ] {
            assert_eq!(RecommendationLevel::parse(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_scenario_issue_matching() {
        let scenario = FutureScenario {
            timeframe: Timeframe {
                code: "5year".to_string(),
                label_ja: "5年後".to_string(),
                years: 5,
            },
            age_min: 7,
            age_max: 18,
            with_treatment_ja: String::new(),
            without_treatment_ja: String::new(),
            issue_ids: Some([IssueId(1), IssueId(2)].into_iter().collect()),
            calculated_from: SourceSet::new(),
            confidence: Confidence::new(0.8),
        };

        let selected: BTreeSet<IssueId> = [IssueId(2), IssueId(9)].into_iter().collect();
        assert!(scenario.applies_to_issues(&selected));

        let disjoint: BTreeSet<IssueId> = [IssueId(9)].into_iter().collect();
        assert!(!scenario.applies_to_issues(&disjoint));

        let universal = FutureScenario {
            issue_ids: None,
            ..scenario
        };
        assert!(universal.applies_to_issues(&disjoint));
    }

    #[test]
    fn test_economic_derivations() {
        let impact = EconomicImpact {
            band: AgeBand {
                code: "pediatric".to_string(),
                label_ja: "小児期 (7-12歳)".to_string(),
                age_min: 7,
                age_max: 12,
            },
            current_cost: 300_000,
            future_savings: 1_500_000,
            roi_percent: 400.0,
            calculation_basis: "医療費削減推計".to_string(),
            calculated_from: SourceSet::new(),
            confidence: Confidence::new(0.7),
        };
        assert_eq!(impact.net_benefit(), 1_200_000);
        assert_eq!(impact.monthly_benefit(), 1_500_000 / 360);
    }
}
