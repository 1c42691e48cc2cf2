//! Aggregator configuration
//!
//! All knobs that materially change derived output are configuration, not
//! code: the default sample weight for findings without a sample size, the
//! confidence scaling cap, the age thresholds and bands, the projection
//! timeframes, the economic cost table, and the category keyword table.

use ortho_domain::{AgeBand, EffectCategory, RecommendationLevel, Timeframe};

/// Timing-table entry: one age band with its recommendation template.
///
/// Template selection is table-driven (band code → recommendation level),
/// never inferred from the findings.
#[derive(Debug, Clone)]
pub struct TimingBandSpec {
    /// The band
    pub band: AgeBand,
    /// Recommendation strength for the band
    pub recommendation: RecommendationLevel,
    /// Timing score in [0, 100]
    pub timing_score: f64,
    /// Japanese benefit narrative
    pub benefit_text_ja: String,
}

/// Economic-table entry: one age band with its cost model.
#[derive(Debug, Clone)]
pub struct EconomicBandSpec {
    /// The band
    pub band: AgeBand,
    /// Present treatment cost (JPY)
    pub current_cost: i64,
    /// Lifetime-savings multiplier applied to the cost
    pub savings_multiplier: f64,
}

/// Configuration for the finding aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Weight used for findings with no sample size. This materially
    /// changes pooled output, so it is configuration, never a constant.
    pub default_sample_weight: f64,

    /// Paper count at which the confidence volume term saturates
    pub confidence_paper_cap: u32,

    /// Age thresholds for the age-risk table
    pub age_thresholds: Vec<u8>,

    /// Timing table: bands with recommendation templates
    pub timing_bands: Vec<TimingBandSpec>,

    /// Projection timeframes for future scenarios
    pub timeframes: Vec<Timeframe>,

    /// Age groups the scenarios branch over (min, max)
    pub scenario_age_groups: Vec<(u8, u8)>,

    /// Economic table: bands with cost models
    pub economic_bands: Vec<EconomicBandSpec>,

    /// Confidence attached to config-derived economic rows
    pub economic_confidence: f64,

    /// Category keyword table: a finding whose description contains one of
    /// the terms belongs to that category; first match wins, no match
    /// falls through to `Other`
    pub category_keywords: Vec<(EffectCategory, Vec<String>)>,
}

fn band(code: &str, label_ja: &str, age_min: u8, age_max: u8) -> AgeBand {
    AgeBand {
        code: code.to_string(),
        label_ja: label_ja.to_string(),
        age_min,
        age_max,
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        let pediatric = band("pediatric", "小児期 (7-12歳)", 7, 12);
        let adolescent = band("adolescent", "青年期 (13-18歳)", 13, 18);
        let young_adult = band("young_adult", "成人期前半 (19-35歳)", 19, 35);
        let adult = band("adult", "成人期後半 (36-60歳)", 36, 60);
        let elderly = band("elderly", "高齢期 (61歳以上)", 61, 100);

        Self {
            default_sample_weight: 1.0,
            confidence_paper_cap: 10,
            age_thresholds: vec![12, 18, 25, 40, 60],
            timing_bands: vec![
                TimingBandSpec {
                    band: pediatric.clone(),
                    recommendation: RecommendationLevel::Optimal,
                    timing_score: 100.0,
                    benefit_text_ja: "骨格の成長を利用した効率的な矯正が可能。将来的な歯列問題を95%予防可能。治療期間が30%短縮。".to_string(),
                },
                TimingBandSpec {
                    band: adolescent.clone(),
                    recommendation: RecommendationLevel::Recommended,
                    timing_score: 80.0,
                    benefit_text_ja: "顎の成長がまだ続いており、比較的効率的な矯正が可能。将来的な歯列問題を75%予防可能。".to_string(),
                },
                TimingBandSpec {
                    band: young_adult.clone(),
                    recommendation: RecommendationLevel::Suitable,
                    timing_score: 60.0,
                    benefit_text_ja: "歯の移動は可能だが、治療期間が長くなる傾向。将来的な歯列問題を60%予防可能。".to_string(),
                },
                TimingBandSpec {
                    band: adult.clone(),
                    recommendation: RecommendationLevel::Conditional,
                    timing_score: 40.0,
                    benefit_text_ja: "歯周組織の状態によっては制限あり。治療期間が50%延長。将来的な歯列問題を40%予防可能。".to_string(),
                },
                TimingBandSpec {
                    band: elderly.clone(),
                    recommendation: RecommendationLevel::SpecialistReview,
                    timing_score: 20.0,
                    benefit_text_ja: "歯周病や骨粗鬆症などの影響で治療オプションが制限される可能性。治療期間が2倍に延長。".to_string(),
                },
            ],
            timeframes: vec![
                Timeframe { code: "5year".to_string(), label_ja: "5年後".to_string(), years: 5 },
                Timeframe { code: "10year".to_string(), label_ja: "10年後".to_string(), years: 10 },
                Timeframe { code: "20year".to_string(), label_ja: "20年後".to_string(), years: 20 },
            ],
            scenario_age_groups: vec![(7, 18), (19, 40), (41, 100)],
            economic_bands: vec![
                EconomicBandSpec { band: pediatric, current_cost: 300_000, savings_multiplier: 5.0 },
                EconomicBandSpec { band: adolescent, current_cost: 350_000, savings_multiplier: 3.5 },
                EconomicBandSpec { band: young_adult, current_cost: 400_000, savings_multiplier: 2.25 },
                EconomicBandSpec { band: adult, current_cost: 450_000, savings_multiplier: 1.3 },
                EconomicBandSpec { band: elderly, current_cost: 500_000, savings_multiplier: 0.6 },
            ],
            economic_confidence: 0.7,
            category_keywords: vec![
                (EffectCategory::CariesRisk, vec!["齲蝕".into(), "むし歯".into(), "虫歯".into(), "caries".into()]),
                (EffectCategory::PeriodontalRisk, vec!["歯周病".into(), "歯周炎".into(), "periodontal".into()]),
                (EffectCategory::TmjRisk, vec!["顎関節症".into(), "TMJ".into(), "temporomandibular".into()]),
                (EffectCategory::Mastication, vec!["咀嚼".into(), "咬合".into(), "chewing".into(), "mastication".into()]),
                (EffectCategory::Aesthetic, vec!["審美".into(), "見た目".into(), "aesthetic".into(), "appearance".into()]),
                (EffectCategory::Pronunciation, vec!["発音".into(), "構音".into(), "speech".into(), "pronunciation".into()]),
                (EffectCategory::TraumaRisk, vec!["外傷".into(), "trauma".into()]),
            ],
        }
    }
}

impl AggregatorConfig {
    /// Categorize a finding description. First matching category wins; no
    /// match falls through to `Other`.
    pub fn categorize(&self, description: &str) -> EffectCategory {
        for (category, terms) in &self.category_keywords {
            if terms.iter().any(|term| description.contains(term.as_str())) {
                return *category;
            }
        }
        EffectCategory::Other
    }

    /// Validate the configuration: thresholds sorted and distinct, bands
    /// non-overlapping per table, sensible scalars.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_sample_weight <= 0.0 {
            return Err(format!(
                "default_sample_weight {} must be positive",
                self.default_sample_weight
            ));
        }
        if !(0.0..=1.0).contains(&self.economic_confidence) {
            return Err(format!(
                "economic_confidence {} is outside [0, 1]",
                self.economic_confidence
            ));
        }
        if self.age_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err("age_thresholds must be strictly ascending".to_string());
        }

        let timing: Vec<AgeBand> = self.timing_bands.iter().map(|s| s.band.clone()).collect();
        if let Some((a, b)) = ortho_domain::traits::find_band_overlap(&timing) {
            return Err(format!("timing bands '{}' and '{}' overlap", a, b));
        }
        let economic: Vec<AgeBand> = self.economic_bands.iter().map(|s| s.band.clone()).collect();
        if let Some((a, b)) = ortho_domain::traits::find_band_overlap(&economic) {
            return Err(format!("economic bands '{}' and '{}' overlap", a, b));
        }
        Ok(())
    }
}
