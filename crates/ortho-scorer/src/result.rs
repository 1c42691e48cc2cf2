//! The necessity result bundle
//!
//! This is the value object handed to the report assembler: the score, its
//! components, the ranked supporting effects, the timing assessment, the
//! applicable future scenarios, and the optional economic projection. The
//! assembler owns all rendering; these types only carry data, serialized as
//! JSON for the audit log and machine consumers.

use ortho_domain::{
    AgeTimingBenefit, EconomicImpact, FutureScenario, IssueTreatmentEffect,
};
use serde::{Deserialize, Serialize};

/// Urgency banding of a necessity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Score >= 85
    Emergency,
    /// Score >= 70
    High,
    /// Score >= 50
    Moderate,
    /// Score >= 30
    Low,
    /// Everything below
    Minimal,
}

impl Urgency {
    /// Band a score.
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Urgency::Emergency,
            70..=84 => Urgency::High,
            50..=69 => Urgency::Moderate,
            30..=49 => Urgency::Low,
            _ => Urgency::Minimal,
        }
    }

    /// Japanese label.
    pub fn label_ja(&self) -> &'static str {
        match self {
            Urgency::Emergency => "緊急",
            Urgency::High => "高",
            Urgency::Moderate => "中",
            Urgency::Low => "低",
            Urgency::Minimal => "最小",
        }
    }

    /// Japanese interpretation sentence.
    pub fn interpretation_ja(&self) -> &'static str {
        match self {
            Urgency::Emergency => "緊急性の高い矯正必要性。早急な対応が強く推奨されます。",
            Urgency::High => "高い矯正必要性。できるだけ早い対応が望ましいです。",
            Urgency::Moderate => "中程度の矯正必要性。計画的な対応を検討してください。",
            Urgency::Low => "低〜中程度の矯正必要性。定期的な経過観察をお勧めします。",
            Urgency::Minimal => "現時点での矯正必要性は低いですが、定期的な評価をお勧めします。",
        }
    }
}

/// The three weighted terms and bonuses that sum to the score before the
/// final clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Timing term (capped at its budget)
    pub timing: f64,
    /// Issue-severity term (capped at its budget)
    pub severity: f64,
    /// Future-risk term (capped at its budget)
    pub risk: f64,
    /// Youth-prevention and adult-complexity bonuses
    pub bonus: f64,
}

/// Where a term's numbers came from, for known-unknown display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum EvidenceBasis {
    /// Derived evidence contributed; `sources` lists the paper ids
    Evidence {
        /// Contributing paper ids
        sources: Vec<i64>,
    },
    /// No derived evidence was available for this term
    InsufficientEvidence,
}

/// The timing assessment for the patient's age.
///
/// An age covered by no timing band yields the explicit `NoData` marker;
/// a neighboring band is never substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimingAssessment {
    /// A timing band covers the age
    Band {
        /// Band code
        code: String,
        /// Band display label
        label_ja: String,
        /// Recommendation label (stable)
        recommendation: String,
        /// Recommendation label (Japanese)
        recommendation_ja: String,
        /// Band timing score in [0, 100]
        timing_score: f64,
        /// Benefit narrative
        benefit_text_ja: String,
        /// Derived confidence of the row
        confidence: f64,
    },
    /// No timing band covers the age
    NoData,
}

impl TimingAssessment {
    /// Build from a timing row.
    pub fn from_row(row: &AgeTimingBenefit) -> Self {
        TimingAssessment::Band {
            code: row.band.code.clone(),
            label_ja: row.band.label_ja.clone(),
            recommendation: row.recommendation_level.as_str().to_string(),
            recommendation_ja: row.recommendation_level.label_ja().to_string(),
            timing_score: row.timing_score,
            benefit_text_ja: row.benefit_text_ja.clone(),
            confidence: row.confidence.value(),
        }
    }
}

/// One treatment effect supporting the recommendation, ranked by magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEffect {
    /// Issue the effect belongs to
    pub issue_id: i64,
    /// Issue display name (Japanese)
    pub issue_name_ja: String,
    /// Effect category label
    pub category: String,
    /// Pooled effect magnitude
    pub effect_value: f64,
    /// Pooled direction label
    pub direction: String,
    /// Narrative
    pub description_ja: String,
    /// Derived confidence of the row
    pub confidence: f64,
    /// Contributing paper ids
    pub sources: Vec<i64>,
}

impl RankedEffect {
    /// Build from an effect row and its issue's display name.
    pub fn from_row(row: &IssueTreatmentEffect, issue_name_ja: &str) -> Self {
        Self {
            issue_id: row.issue_id.value(),
            issue_name_ja: issue_name_ja.to_string(),
            category: row.effect_category.as_str().to_string(),
            effect_value: row.effect_value,
            direction: row.effect_direction.as_str().to_string(),
            description_ja: row.description_ja.clone(),
            confidence: row.confidence.value(),
            sources: row.calculated_from.iter().map(|id| id.value()).collect(),
        }
    }
}

/// One future scenario applicable to the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// Timeframe label (Japanese)
    pub timeframe_ja: String,
    /// Projection horizon in years
    pub years: u8,
    /// With-treatment narrative
    pub with_treatment_ja: String,
    /// Without-treatment narrative
    pub without_treatment_ja: String,
    /// Derived confidence of the row
    pub confidence: f64,
}

impl ScenarioSummary {
    /// Build from a scenario row.
    pub fn from_row(row: &FutureScenario) -> Self {
        Self {
            timeframe_ja: row.timeframe.label_ja.clone(),
            years: row.timeframe.years,
            with_treatment_ja: row.with_treatment_ja.clone(),
            without_treatment_ja: row.without_treatment_ja.clone(),
            confidence: row.confidence.value(),
        }
    }
}

/// The economic projection for the patient's age band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSummary {
    /// Band label (Japanese)
    pub band_ja: String,
    /// Present treatment cost (JPY)
    pub current_cost: i64,
    /// Projected lifetime savings (JPY)
    pub future_savings: i64,
    /// Savings net of cost (JPY)
    pub net_benefit: i64,
    /// Savings per month over a 30-year horizon (JPY)
    pub monthly_benefit: i64,
    /// Return on investment in percent
    pub roi_percent: f64,
}

impl EconomicSummary {
    /// Build from an economic row.
    pub fn from_row(row: &EconomicImpact) -> Self {
        Self {
            band_ja: row.band.label_ja.clone(),
            current_cost: row.current_cost,
            future_savings: row.future_savings,
            net_benefit: row.net_benefit(),
            monthly_benefit: row.monthly_benefit(),
            roi_percent: row.roi_percent,
        }
    }
}

/// The full scoring result handed to the report assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NecessityResult {
    /// Necessity score in [0, 100]
    pub score: u8,
    /// The terms behind the score
    pub components: ScoreComponents,
    /// Urgency band of the score
    pub urgency: Urgency,
    /// Japanese interpretation of the urgency band
    pub interpretation_ja: String,
    /// Timing assessment for the patient's age
    pub timing: TimingAssessment,
    /// Where the risk term's numbers came from
    pub risk_basis: EvidenceBasis,
    /// Supporting treatment effects, strongest first
    pub ranked_findings: Vec<RankedEffect>,
    /// Applicable future scenarios, nearest horizon first
    pub scenarios: Vec<ScenarioSummary>,
    /// Economic projection, when the age falls in a configured band
    pub economics: Option<EconomicSummary>,
}
