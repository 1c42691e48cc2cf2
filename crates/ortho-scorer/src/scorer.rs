//! Necessity scoring logic

use crate::result::{
    EconomicSummary, EvidenceBasis, NecessityResult, RankedEffect, ScenarioSummary,
    ScoreComponents, TimingAssessment, Urgency,
};
use crate::{ScoreError, ScorerConfig};
use ortho_domain::traits::{timing_benefit_for_age, EvidenceStore};
use ortho_domain::{DentalIssue, IssueId, ReportId, UserReport};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// The patient inputs to one scoring request.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientProfile {
    /// Patient age in years
    pub age: u8,
    /// Selected issue ids; duplicates collapse
    pub issue_ids: Vec<IssueId>,
}

impl PatientProfile {
    /// Create a profile.
    pub fn new(age: u8, issue_ids: Vec<IssueId>) -> Self {
        Self { age, issue_ids }
    }
}

/// The necessity scorer.
pub struct Scorer {
    config: ScorerConfig,
}

impl Scorer {
    /// Create a scorer with the given configuration.
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Create a scorer with default configuration.
    pub fn default_config() -> Self {
        Self::new(ScorerConfig::default())
    }

    /// Score a patient against the evidence store.
    ///
    /// Read-only; any number of callers may score concurrently, including
    /// while an aggregation batch regenerates the derived tables (every
    /// derived row is upserted atomically, so no torn row is observable).
    ///
    /// Validation failures reject the request outright. Data sparsity does
    /// not: a missing timing band or empty age-risk table degrades to an
    /// explicit marker and the score is still computed from what remains.
    pub fn score<S: EvidenceStore>(
        &self,
        store: &S,
        patient: &PatientProfile,
    ) -> Result<NecessityResult, ScoreError> {
        self.config.validate().map_err(ScoreError::Config)?;
        let issues = self.validate(store, patient)?;

        let (severity, ranked_findings) = self.severity_term(store, &issues)?;
        let (timing_points, timing) = self.timing_term(store, patient.age)?;
        let (risk, risk_basis) = self.risk_term(store, patient.age, issues.len())?;
        let bonus = self.bonuses(patient.age, issues.len());

        let raw_total = timing_points + severity + risk + bonus;
        let score = raw_total.round().clamp(0.0, 100.0) as u8;
        let urgency = Urgency::from_score(score);

        let selected: BTreeSet<IssueId> = issues.iter().map(|i| i.id).collect();
        let scenarios: Vec<ScenarioSummary> = store
            .scenarios_for_age(patient.age)
            .map_err(|e| ScoreError::Store(e.to_string()))?
            .iter()
            .filter(|s| s.applies_to_issues(&selected))
            .map(ScenarioSummary::from_row)
            .collect();

        let economics = store
            .economic_impact_for_age(patient.age)
            .map_err(|e| ScoreError::Store(e.to_string()))?
            .as_ref()
            .map(EconomicSummary::from_row);

        tracing::debug!(
            age = patient.age,
            issues = issues.len(),
            score,
            urgency = urgency.label_ja(),
            "patient scored"
        );

        Ok(NecessityResult {
            score,
            components: ScoreComponents {
                timing: timing_points,
                severity,
                risk,
                bonus,
            },
            urgency,
            interpretation_ja: urgency.interpretation_ja().to_string(),
            timing,
            risk_basis,
            ranked_findings,
            scenarios,
            economics,
        })
    }

    /// Score a patient and append the result to the audit log.
    pub fn score_and_log<S: EvidenceStore>(
        &self,
        store: &mut S,
        patient: &PatientProfile,
        notes: Option<String>,
    ) -> Result<(NecessityResult, ReportId), ScoreError> {
        let result = self.score(store, patient)?;

        let report = UserReport {
            id: ReportId::new(),
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            patient_age: patient.age,
            issue_ids: patient.issue_ids.clone(),
            necessity_score: result.score,
            urgency: result.urgency.label_ja().to_string(),
            result_json: serde_json::to_string(&result)
                .map_err(|e| ScoreError::Serialization(e.to_string()))?,
            notes,
        };
        let id = store
            .append_report(&report)
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        Ok((result, id))
    }

    /// Validate the request: non-empty selection, supported age, and every
    /// issue id resolvable. Fails fast before any computation.
    fn validate<S: EvidenceStore>(
        &self,
        store: &S,
        patient: &PatientProfile,
    ) -> Result<Vec<DentalIssue>, ScoreError> {
        if patient.issue_ids.is_empty() {
            return Err(ScoreError::EmptyIssueSelection);
        }
        if patient.age > self.config.max_age {
            return Err(ScoreError::AgeOutOfRange {
                age: patient.age,
                max: self.config.max_age,
            });
        }

        let unique: BTreeSet<IssueId> = patient.issue_ids.iter().copied().collect();
        let mut issues = Vec::with_capacity(unique.len());
        for id in unique {
            match store.get_issue(id).map_err(|e| ScoreError::Store(e.to_string()))? {
                Some(issue) => issues.push(issue),
                None => return Err(ScoreError::UnknownIssue(id)),
            }
        }
        Ok(issues)
    }

    /// Issue-severity term plus the ranked supporting effects.
    ///
    /// Each issue's base severity is adjusted by its strongest treatment
    /// effect: `severity * (1 + clamp(effect / 100, -bound, +bound))`.
    /// Using only the strongest effect per issue avoids double counting
    /// categories pooled from the same papers. Adjusted severities combine
    /// as the primary issue plus a discounted sum of the rest, scaled into
    /// the term budget and capped there.
    fn severity_term<S: EvidenceStore>(
        &self,
        store: &S,
        issues: &[DentalIssue],
    ) -> Result<(f64, Vec<RankedEffect>), ScoreError> {
        let mut adjusted: Vec<f64> = Vec::with_capacity(issues.len());
        let mut ranked: Vec<RankedEffect> = Vec::new();

        for issue in issues {
            let effects = store
                .treatment_effects_for_issue(issue.id)
                .map_err(|e| ScoreError::Store(e.to_string()))?;

            let strongest = effects
                .iter()
                .map(|e| e.effect_value)
                .fold(0.0_f64, f64::max);
            let bound = self.config.effect_adjust_bound;
            let multiplier = 1.0 + (strongest / 100.0).clamp(-bound, bound);
            adjusted.push((issue.severity_base_score * multiplier).min(100.0));

            ranked.extend(effects.iter().map(|e| RankedEffect::from_row(e, &issue.name_ja)));
        }

        ranked.sort_by(|a, b| {
            b.effect_value
                .partial_cmp(&a.effect_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.issue_id.cmp(&b.issue_id))
        });

        adjusted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let primary = adjusted.first().copied().unwrap_or(0.0);
        let secondary: f64 = adjusted.iter().skip(1).sum::<f64>() * self.config.secondary_issue_factor;

        let weight = self.config.severity_weight;
        let severity = ((primary + secondary) / 100.0 * weight).min(weight);
        Ok((severity, ranked))
    }

    /// Timing term from the band containing the patient's age.
    ///
    /// A gap between bands yields the explicit no-data marker and a zero
    /// contribution; a neighboring band is never substituted.
    fn timing_term<S: EvidenceStore>(
        &self,
        store: &S,
        age: u8,
    ) -> Result<(f64, TimingAssessment), ScoreError> {
        match timing_benefit_for_age(store, age).map_err(|e| ScoreError::Store(e.to_string()))? {
            Some(row) => {
                let weight = self.config.timing_weight;
                let points = ((row.timing_score / 100.0) * weight).min(weight).max(0.0);
                Ok((points, TimingAssessment::from_row(&row)))
            }
            None => Ok((0.0, TimingAssessment::NoData)),
        }
    }

    /// Future-risk term from the age-risk profiles.
    ///
    /// The nearest threshold not exceeding the patient's age governs: its
    /// rows' risk values fold additively, are normalized, scaled by the
    /// multi-issue problem factor, and capped at the term budget. The term
    /// is scaled independently from issue severity, so neither can push the
    /// total out of bounds on its own.
    fn risk_term<S: EvidenceStore>(
        &self,
        store: &S,
        age: u8,
        issue_count: usize,
    ) -> Result<(f64, EvidenceBasis), ScoreError> {
        let profiles = store
            .age_risk_profiles()
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        let governing = profiles
            .iter()
            .filter(|p| p.age_threshold <= age)
            .map(|p| p.age_threshold)
            .max();

        let Some(threshold) = governing else {
            return Ok((0.0, EvidenceBasis::InsufficientEvidence));
        };

        let rows: Vec<_> = profiles
            .iter()
            .filter(|p| p.age_threshold == threshold)
            .collect();

        let folded: f64 = rows.iter().map(|p| p.risk_value).sum();
        let problem_factor = (1.0
            + self.config.problem_factor_step * (issue_count.saturating_sub(1)) as f64)
            .min(self.config.problem_factor_max);

        let weight = self.config.risk_weight;
        let risk = ((folded / self.config.risk_scale_denominator) * problem_factor * weight)
            .min(weight)
            .max(0.0);

        let mut sources: BTreeSet<i64> = BTreeSet::new();
        for row in &rows {
            sources.extend(row.calculated_from.iter().map(|id| id.value()));
        }

        Ok((
            risk,
            EvidenceBasis::Evidence {
                sources: sources.into_iter().collect(),
            },
        ))
    }

    /// Youth-prevention and adult-complexity bonuses.
    fn bonuses(&self, age: u8, issue_count: usize) -> f64 {
        let mut bonus = 0.0;
        if age <= 18 {
            bonus += (18 - age) as f64 * self.config.youth_bonus_per_year;
        }
        let (lo, hi) = self.config.adult_bonus_ages;
        if (lo..=hi).contains(&age) && issue_count >= 2 {
            bonus += (issue_count - 1) as f64 * self.config.adult_complexity_bonus;
        }
        bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho_aggregator::{Aggregator, AggregatorConfig, CancelFlag};
    use ortho_domain::{
        AgeRange, Confidence, EffectCategory, EffectDirection, EvidenceLevel, FindingType,
        IssueTreatmentEffect, NewDentalIssue, NewPaper, NewResearchFinding, PaperId, SourceSet,
    };
    use ortho_store::SqliteStore;

    fn seed_issue(store: &mut SqliteStore, code: &str, severity: f64) -> IssueId {
        store
            .insert_issue(NewDentalIssue {
                code: code.to_string(),
                name_ja: format!("{}-ja", code),
                name_en: code.to_string(),
                severity_base_score: severity,
            })
            .unwrap()
    }

    fn seed_effect(store: &mut SqliteStore, issue: IssueId, category: EffectCategory, value: f64) {
        store
            .upsert_treatment_effect(&IssueTreatmentEffect {
                issue_id: issue,
                effect_category: category,
                effect_value: value,
                effect_direction: EffectDirection::Decrease,
                description_ja: "矯正による改善".to_string(),
                calculated_from: SourceSet::from_ids([PaperId(1)]),
                confidence: Confidence::new(0.6),
            })
            .unwrap();
    }

    /// A store with a full set of derived tables, built by the real
    /// aggregator over a small evidence base.
    fn aggregated_store() -> (SqliteStore, IssueId) {
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "impacted", 75.0);

        let mut paper = NewPaper::titled("Impaction outcomes", EvidenceLevel::Ib);
        paper.sample_size = Some(150);
        let paper = store.insert_paper(paper).unwrap();

        store
            .insert_finding(NewResearchFinding {
                paper_id: paper,
                issue_id: issue,
                finding_type: FindingType::Risk,
                description_ja: Some("歯周病リスク上昇".to_string()),
                effect_value: 30.0,
                effect_direction: EffectDirection::Increase,
                confidence_interval: None,
                p_value: None,
                age_range: AgeRange::bounded(10, 60),
            })
            .unwrap();

        Aggregator::new(AggregatorConfig::default())
            .run(&mut store, &CancelFlag::new())
            .unwrap();
        (store, issue)
    }

    #[test]
    fn test_empty_issue_selection_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let result = Scorer::default_config().score(&store, &PatientProfile::new(25, vec![]));
        assert!(matches!(result, Err(ScoreError::EmptyIssueSelection)));
    }

    #[test]
    fn test_age_out_of_range_rejected() {
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "crowding", 70.0);
        let result = Scorer::default_config().score(&store, &PatientProfile::new(121, vec![issue]));
        assert!(matches!(result, Err(ScoreError::AgeOutOfRange { age: 121, .. })));
    }

    #[test]
    fn test_unknown_issue_rejects_whole_request() {
        let mut store = SqliteStore::in_memory().unwrap();
        let known = seed_issue(&mut store, "crowding", 70.0);
        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![known, IssueId(999)]));
        assert!(matches!(result, Err(ScoreError::UnknownIssue(IssueId(999)))));
    }

    #[test]
    fn test_effect_adjusted_severity_matches_worked_example() {
        // Issue with base severity 75 and one supporting effect of 20:
        // adjusted severity = 75 * 1.2 = 90, severity term = 90/100 * 40.
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "impacted", 75.0);
        seed_effect(&mut store, issue, EffectCategory::CariesRisk, 20.0);

        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![issue]))
            .unwrap();

        assert!((result.components.severity - 36.0).abs() < 1e-9);
        assert!(result.score <= 100);
    }

    #[test]
    fn test_effect_multiplier_is_bounded() {
        // A 200-point effect clamps to +50%: 60 * 1.5 = 90 -> 36 points.
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "crowding", 60.0);
        seed_effect(&mut store, issue, EffectCategory::CariesRisk, 200.0);

        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![issue]))
            .unwrap();
        assert!((result.components.severity - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_timing_band_yields_explicit_marker_not_error() {
        // No derived tables at all: the score still computes from severity.
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "crowding", 70.0);

        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![issue]))
            .unwrap();

        assert_eq!(result.timing, TimingAssessment::NoData);
        assert_eq!(result.risk_basis, EvidenceBasis::InsufficientEvidence);
        assert_eq!(result.components.timing, 0.0);
        assert!((result.components.severity - 28.0).abs() < 1e-9);
        assert_eq!(result.score, 28);
    }

    #[test]
    fn test_age_gap_between_bands_is_no_data() {
        // Aggregated tables cover 7-100; ages below 7 fall in a gap.
        let (store, issue) = aggregated_store();
        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(3, vec![issue]))
            .unwrap();
        assert_eq!(result.timing, TimingAssessment::NoData);
        assert!(result.score > 0, "severity alone still produces a score");
    }

    #[test]
    fn test_full_bundle_from_aggregated_tables() {
        let (store, issue) = aggregated_store();
        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![issue]))
            .unwrap();

        match &result.timing {
            TimingAssessment::Band { code, timing_score, .. } => {
                assert_eq!(code, "young_adult");
                assert_eq!(*timing_score, 60.0);
            }
            TimingAssessment::NoData => panic!("age 25 must fall in a band"),
        }
        assert!(matches!(result.risk_basis, EvidenceBasis::Evidence { .. }));
        assert!(!result.ranked_findings.is_empty());
        assert_eq!(result.scenarios.len(), 3, "one per timeframe");
        assert!(result.scenarios.windows(2).all(|w| w[0].years <= w[1].years));
        let economics = result.economics.expect("age 25 falls in an economic band");
        assert_eq!(economics.current_cost, 400_000);
    }

    #[test]
    fn test_governing_threshold_is_nearest_not_exceeding_age() {
        let (store, issue) = aggregated_store();
        let scorer = Scorer::default_config();

        // Age 11: no threshold <= 11 exists (lowest is 12).
        let young = scorer.score(&store, &PatientProfile::new(11, vec![issue])).unwrap();
        assert_eq!(young.risk_basis, EvidenceBasis::InsufficientEvidence);
        assert_eq!(young.components.risk, 0.0);

        // Age 30: thresholds 12, 18, 25 qualify; 25 governs.
        let adult = scorer.score(&store, &PatientProfile::new(30, vec![issue])).unwrap();
        assert!(matches!(adult.risk_basis, EvidenceBasis::Evidence { .. }));
        assert!(adult.components.risk > 0.0);
    }

    #[test]
    fn test_ranked_findings_strongest_first() {
        let mut store = SqliteStore::in_memory().unwrap();
        let crowding = seed_issue(&mut store, "crowding", 70.0);
        let open_bite = seed_issue(&mut store, "open_bite", 65.0);
        seed_effect(&mut store, crowding, EffectCategory::CariesRisk, 38.0);
        seed_effect(&mut store, crowding, EffectCategory::PeriodontalRisk, 45.0);
        seed_effect(&mut store, open_bite, EffectCategory::Pronunciation, 90.0);

        let result = Scorer::default_config()
            .score(&store, &PatientProfile::new(25, vec![crowding, open_bite]))
            .unwrap();

        let values: Vec<f64> = result.ranked_findings.iter().map(|r| r.effect_value).collect();
        assert_eq!(values, vec![90.0, 45.0, 38.0]);
    }

    #[test]
    fn test_multi_issue_combination_discounts_secondaries() {
        let mut store = SqliteStore::in_memory().unwrap();
        let a = seed_issue(&mut store, "a", 80.0);
        let b = seed_issue(&mut store, "b", 60.0);

        let scorer = Scorer::default_config();
        let single = scorer.score(&store, &PatientProfile::new(25, vec![a])).unwrap();
        let both = scorer.score(&store, &PatientProfile::new(25, vec![a, b])).unwrap();

        // 80 -> 32 points; 80 + 0.5*60 = 110 -> capped at 40.
        assert!((single.components.severity - 32.0).abs() < 1e-9);
        assert!((both.components.severity - 40.0).abs() < 1e-9);
        assert!(both.score >= single.score);
    }

    #[test]
    fn test_duplicate_issue_ids_collapse() {
        let mut store = SqliteStore::in_memory().unwrap();
        let issue = seed_issue(&mut store, "crowding", 70.0);
        let scorer = Scorer::default_config();

        let once = scorer.score(&store, &PatientProfile::new(25, vec![issue])).unwrap();
        let twice = scorer
            .score(&store, &PatientProfile::new(25, vec![issue, issue]))
            .unwrap();
        assert_eq!(once.score, twice.score);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let (store, issue) = aggregated_store();
        let scorer = Scorer::default_config();
        let patient = PatientProfile::new(25, vec![issue]);

        let first = scorer.score(&store, &patient).unwrap();
        let second = scorer.score(&store, &patient).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_and_log_appends_audit_record() {
        let (mut store, issue) = aggregated_store();
        let scorer = Scorer::default_config();

        let (result, id) = scorer
            .score_and_log(
                &mut store,
                &PatientProfile::new(25, vec![issue]),
                Some("初診".to_string()),
            )
            .unwrap();

        let reports = store.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, id);
        assert_eq!(reports[0].necessity_score, result.score);
        assert_eq!(reports[0].notes.as_deref(), Some("初診"));

        let logged: NecessityResult = serde_json::from_str(&reports[0].result_json).unwrap();
        assert_eq!(logged, result);
    }

    #[test]
    fn test_validation_failure_logs_nothing() {
        let mut store = SqliteStore::in_memory().unwrap();
        let scorer = Scorer::default_config();

        let result = scorer.score_and_log(&mut store, &PatientProfile::new(25, vec![IssueId(5)]), None);
        assert!(result.is_err());
        assert!(store.list_reports().unwrap().is_empty());
    }
}
