//! Core aggregation batch

use crate::report::{AggregationReport, GroupKey, SkipReason};
use crate::templates;
use crate::{AggregateError, AggregatorConfig, CancelFlag, RegenerationLock};
use ortho_domain::traits::EvidenceStore;
use ortho_domain::{
    evidence_confidence, AgeRange, AgeRiskProfile, AgeTimingBenefit, Confidence, DentalIssue,
    EconomicImpact, EffectCategory, EffectDirection, EvidenceLevel, FindingType, FutureScenario,
    IssueId, IssueTreatmentEffect, Paper, PaperId, ResearchFinding, RiskType, SourceSet,
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

/// The finding aggregator.
///
/// Holds the configuration and the single-flight lock. Construct one per
/// regeneration job, or share a [`RegenerationLock`] across several to
/// serialize them.
pub struct Aggregator {
    config: AggregatorConfig,
    lock: RegenerationLock,
}

/// Everything a batch reads up front.
struct BatchInput {
    findings: Vec<ResearchFinding>,
    papers: BTreeMap<PaperId, Paper>,
    issues: Vec<DentalIssue>,
}

/// Result of pooling one group of findings.
struct PooledGroup {
    value: f64,
    direction: EffectDirection,
    sources: SourceSet,
    confidence: Confidence,
}

impl Aggregator {
    /// Create an aggregator with its own single-flight lock.
    pub fn new(config: AggregatorConfig) -> Self {
        Self::with_lock(config, RegenerationLock::new())
    }

    /// Create an aggregator sharing an existing lock.
    pub fn with_lock(config: AggregatorConfig, lock: RegenerationLock) -> Self {
        Self { config, lock }
    }

    /// Create an aggregator with default configuration.
    pub fn default_config() -> Self {
        Self::new(AggregatorConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// The single-flight lock guarding this aggregator's runs.
    pub fn lock(&self) -> &RegenerationLock {
        &self.lock
    }

    /// Run one regeneration batch.
    ///
    /// Regenerates all five derived tables via keyed upserts. Returns
    /// `AlreadyRunning` if another run holds the lock. Cancellation is
    /// honored between group computations; groups committed before the
    /// cancellation stay in place and the report says `cancelled`.
    pub fn run<S: EvidenceStore>(
        &self,
        store: &mut S,
        cancel: &CancelFlag,
    ) -> Result<AggregationReport, AggregateError> {
        self.config.validate().map_err(AggregateError::Config)?;

        let _guard = self
            .lock
            .try_acquire()
            .ok_or(AggregateError::AlreadyRunning)?;

        let start = SystemTime::now();
        let mut report = AggregationReport::new();

        let input = BatchInput {
            findings: store
                .list_findings()
                .map_err(|e| AggregateError::Store(e.to_string()))?,
            papers: store
                .list_papers()
                .map_err(|e| AggregateError::Store(e.to_string()))?
                .into_iter()
                .map(|p| (p.id, p))
                .collect(),
            issues: store
                .list_issues()
                .map_err(|e| AggregateError::Store(e.to_string()))?,
        };

        tracing::info!(
            findings = input.findings.len(),
            papers = input.papers.len(),
            issues = input.issues.len(),
            "starting aggregation batch"
        );

        self.generate_age_risk_profiles(store, &input, cancel, &mut report)?;
        if !report.cancelled {
            self.generate_treatment_effects(store, &input, cancel, &mut report)?;
        }
        if !report.cancelled {
            self.generate_timing_benefits(store, &input, cancel, &mut report)?;
        }
        if !report.cancelled {
            self.generate_future_scenarios(store, &input, cancel, &mut report)?;
        }
        if !report.cancelled {
            self.generate_economic_impacts(store, cancel, &mut report)?;
        }

        if let Ok(elapsed) = start.elapsed() {
            report.runtime_secs = elapsed.as_secs();
        }

        tracing::info!(
            rows = report.total_rows(),
            skipped = report.skipped.len(),
            cancelled = report.cancelled,
            "aggregation batch finished"
        );

        Ok(report)
    }

    /// Pool one group of findings into a single derived statistic.
    ///
    /// Returns the skip reason instead of a row when the group is empty,
    /// references entities that do not exist, or ties on direction.
    fn pool_group(
        &self,
        group: &[&ResearchFinding],
        input: &BatchInput,
    ) -> Result<PooledGroup, SkipReason> {
        if group.is_empty() {
            return Err(SkipReason::InsufficientEvidence);
        }

        // Referential integrity first: a dangling reference poisons the
        // whole group, not the batch.
        let issue_ids: BTreeSet<IssueId> = input.issues.iter().map(|i| i.id).collect();
        for finding in group {
            if !input.papers.contains_key(&finding.paper_id) {
                return Err(SkipReason::Integrity(format!(
                    "finding {} references missing paper {}",
                    finding.id, finding.paper_id
                )));
            }
            if !issue_ids.contains(&finding.issue_id) {
                return Err(SkipReason::Integrity(format!(
                    "finding {} references missing issue {}",
                    finding.id, finding.issue_id
                )));
            }
        }

        // Majority direction; an exact tie is excluded, never resolved by
        // arbitrary tie-break.
        let increases = group
            .iter()
            .filter(|f| f.effect_direction == EffectDirection::Increase)
            .count();
        let decreases = group.len() - increases;
        let direction = match increases.cmp(&decreases) {
            std::cmp::Ordering::Greater => EffectDirection::Increase,
            std::cmp::Ordering::Less => EffectDirection::Decrease,
            std::cmp::Ordering::Equal => return Err(SkipReason::MixedDirection),
        };

        // Sample-size-weighted mean; findings without a sample size carry
        // the configured default weight.
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for finding in group {
            let weight = input.papers[&finding.paper_id]
                .sample_size
                .filter(|n| *n > 0)
                .map(|n| n as f64)
                .unwrap_or(self.config.default_sample_weight);
            weighted_sum += finding.effect_value * weight;
            total_weight += weight;
        }
        let value = weighted_sum / total_weight;

        let sources: SourceSet = group.iter().map(|f| f.paper_id).collect();
        let levels: Vec<EvidenceLevel> = sources
            .iter()
            .map(|id| input.papers[&id].evidence_level)
            .collect();
        let confidence = evidence_confidence(&levels, self.config.confidence_paper_cap);

        Ok(PooledGroup {
            value,
            direction,
            sources,
            confidence,
        })
    }

    /// Regenerate the age-risk table: one group per configured threshold.
    ///
    /// The bucket at threshold `t` is the untreated-risk evidence still
    /// applicable at ages `>= t`: risk-type, increase-direction findings
    /// whose age range overlaps `[t, ∞)`.
    fn generate_age_risk_profiles<S: EvidenceStore>(
        &self,
        store: &mut S,
        input: &BatchInput,
        cancel: &CancelFlag,
        report: &mut AggregationReport,
    ) -> Result<(), AggregateError> {
        for &threshold in &self.config.age_thresholds {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }

            let bucket = AgeRange {
                min: Some(threshold),
                max: None,
            };
            let group: Vec<&ResearchFinding> = input
                .findings
                .iter()
                .filter(|f| {
                    f.finding_type == FindingType::Risk
                        && f.effect_direction == EffectDirection::Increase
                        && f.age_range.overlaps(&bucket)
                })
                .collect();

            let pooled = match self.pool_group(&group, input) {
                Ok(pooled) => pooled,
                Err(reason) => {
                    report.record_skip(GroupKey::AgeThreshold(threshold), reason);
                    continue;
                }
            };

            for (risk_type, value) in derived_risk_rows(threshold, pooled.value) {
                let row = AgeRiskProfile {
                    age_threshold: threshold,
                    risk_type,
                    risk_value: value,
                    description_ja: templates::risk_description(risk_type, threshold, value),
                    calculated_from: pooled.sources.clone(),
                    confidence: pooled.confidence,
                };
                store
                    .upsert_age_risk_profile(&row)
                    .map_err(|e| AggregateError::Store(e.to_string()))?;
                report.age_risk_rows += 1;
            }
        }
        Ok(())
    }

    /// Regenerate the treatment-effect table: one group per
    /// (issue, effect category).
    fn generate_treatment_effects<S: EvidenceStore>(
        &self,
        store: &mut S,
        input: &BatchInput,
        cancel: &CancelFlag,
        report: &mut AggregationReport,
    ) -> Result<(), AggregateError> {
        for issue in &input.issues {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }

            let issue_findings: Vec<&ResearchFinding> = input
                .findings
                .iter()
                .filter(|f| f.issue_id == issue.id)
                .collect();

            if issue_findings.is_empty() {
                report.record_skip(
                    GroupKey::IssueCategory(issue.id.value(), "all"),
                    SkipReason::InsufficientEvidence,
                );
                continue;
            }

            let mut by_category: BTreeMap<EffectCategory, Vec<&ResearchFinding>> = BTreeMap::new();
            for finding in issue_findings {
                let category = finding
                    .description_ja
                    .as_deref()
                    .map(|d| self.config.categorize(d))
                    .unwrap_or(EffectCategory::Other);
                by_category.entry(category).or_default().push(finding);
            }

            for (category, group) in by_category {
                let pooled = match self.pool_group(&group, input) {
                    Ok(pooled) => pooled,
                    Err(reason) => {
                        report.record_skip(
                            GroupKey::IssueCategory(issue.id.value(), category.as_str()),
                            reason,
                        );
                        continue;
                    }
                };

                let row = IssueTreatmentEffect {
                    issue_id: issue.id,
                    effect_category: category,
                    effect_value: pooled.value,
                    effect_direction: pooled.direction,
                    description_ja: templates::effect_description(
                        &issue.name_ja,
                        category,
                        pooled.value,
                        pooled.direction,
                    ),
                    calculated_from: pooled.sources,
                    confidence: pooled.confidence,
                };
                store
                    .upsert_treatment_effect(&row)
                    .map_err(|e| AggregateError::Store(e.to_string()))?;
                report.treatment_effect_rows += 1;
            }
        }
        Ok(())
    }

    /// Regenerate the timing table from the configured band specs.
    ///
    /// Texts and recommendation levels come from the table-driven config;
    /// the evidence contributes the confidence (more overlapping findings,
    /// higher confidence) and the audit source set.
    fn generate_timing_benefits<S: EvidenceStore>(
        &self,
        store: &mut S,
        input: &BatchInput,
        cancel: &CancelFlag,
        report: &mut AggregationReport,
    ) -> Result<(), AggregateError> {
        for spec in &self.config.timing_bands {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }

            // Only findings with a resolvable paper count as evidence here.
            let overlapping: Vec<&ResearchFinding> = input
                .findings
                .iter()
                .filter(|f| {
                    f.age_range.overlaps(&spec.band.range())
                        && input.papers.contains_key(&f.paper_id)
                })
                .collect();

            let confidence = if overlapping.is_empty() {
                Confidence::new(0.7)
            } else {
                Confidence::new((0.5 + overlapping.len() as f64 / 20.0).min(0.95))
            };
            let sources: SourceSet = overlapping.iter().map(|f| f.paper_id).collect();

            let row = AgeTimingBenefit {
                band: spec.band.clone(),
                benefit_text_ja: spec.benefit_text_ja.clone(),
                recommendation_level: spec.recommendation,
                timing_score: spec.timing_score,
                calculated_from: sources,
                confidence,
            };
            store
                .upsert_timing_benefit(&row)
                .map_err(|e| AggregateError::Store(e.to_string()))?;
            report.timing_rows += 1;
        }
        Ok(())
    }

    /// Regenerate the future-scenario table: one cell per
    /// (timeframe, scenario age group).
    fn generate_future_scenarios<S: EvidenceStore>(
        &self,
        store: &mut S,
        input: &BatchInput,
        cancel: &CancelFlag,
        report: &mut AggregationReport,
    ) -> Result<(), AggregateError> {
        for timeframe in &self.config.timeframes {
            for &(age_min, age_max) in &self.config.scenario_age_groups {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    return Ok(());
                }

                let group_range = AgeRange::bounded(age_min, age_max);
                let sources: SourceSet = input
                    .findings
                    .iter()
                    .filter(|f| {
                        f.age_range.overlaps(&group_range)
                            && input.papers.contains_key(&f.paper_id)
                    })
                    .map(|f| f.paper_id)
                    .collect();

                // Longer projections carry less certainty.
                let confidence = Confidence::new(0.8 - timeframe.years as f64 / 50.0);

                let row = FutureScenario {
                    timeframe: timeframe.clone(),
                    age_min,
                    age_max,
                    with_treatment_ja: templates::with_treatment_scenario(timeframe.years, age_min),
                    without_treatment_ja: templates::without_treatment_scenario(
                        timeframe.years,
                        age_min,
                    ),
                    issue_ids: None,
                    calculated_from: sources,
                    confidence,
                };
                store
                    .upsert_future_scenario(&row)
                    .map_err(|e| AggregateError::Store(e.to_string()))?;
                report.scenario_rows += 1;
            }
        }
        Ok(())
    }

    /// Regenerate the economic table from the configured cost model.
    fn generate_economic_impacts<S: EvidenceStore>(
        &self,
        store: &mut S,
        cancel: &CancelFlag,
        report: &mut AggregationReport,
    ) -> Result<(), AggregateError> {
        for spec in &self.config.economic_bands {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }

            let future_savings = (spec.current_cost as f64 * spec.savings_multiplier) as i64;
            let roi_percent =
                ((future_savings - spec.current_cost) as f64 / spec.current_cost as f64) * 100.0;

            let row = EconomicImpact {
                band: spec.band.clone(),
                current_cost: spec.current_cost,
                future_savings,
                roi_percent,
                calculation_basis: "医療費削減推計".to_string(),
                calculated_from: SourceSet::new(),
                confidence: Confidence::new(self.config.economic_confidence),
            };
            store
                .upsert_economic_impact(&row)
                .map_err(|e| AggregateError::Store(e.to_string()))?;
            report.economic_rows += 1;
        }
        Ok(())
    }
}

/// Rows derived from one pooled untreated-risk value at a threshold.
///
/// The base tooth-loss row carries the pooled value; the companion risk
/// types appear from the thresholds where the evidence base starts speaking
/// to them, scaled by the original cohort multipliers and capped.
fn derived_risk_rows(threshold: u8, pooled: f64) -> Vec<(RiskType, f64)> {
    let mut rows = vec![(RiskType::ToothLoss, pooled)];
    if threshold >= 18 {
        rows.push((RiskType::Periodontal, (pooled * 1.2).min(95.0)));
    }
    if threshold >= 25 {
        rows.push((RiskType::Tmj, (pooled * 0.06).min(3.0)));
    }
    if threshold >= 40 {
        rows.push((RiskType::Mastication, (pooled * 0.8).min(50.0)));
    }
    if threshold >= 60 {
        rows.push((RiskType::Speech, (pooled * 0.04).min(3.0)));
    }
    rows
}
