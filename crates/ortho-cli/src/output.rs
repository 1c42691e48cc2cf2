//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::Colorize;
use ortho_domain::{
    AgeRiskProfile, AgeTimingBenefit, EconomicImpact, FutureScenario, IssueTreatmentEffect,
    UserReport,
};
use ortho_scorer::{NecessityResult, TimingAssessment, Urgency};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    fn build_table(header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().copied());
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn colorize(&self, text: &str, urgency: Urgency) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        match urgency {
            Urgency::Emergency => text.red().bold().to_string(),
            Urgency::High => text.red().to_string(),
            Urgency::Moderate => text.yellow().to_string(),
            Urgency::Low => text.green().to_string(),
            Urgency::Minimal => text.blue().to_string(),
        }
    }

    /// Format a scoring result.
    pub fn format_score(&self, result: &NecessityResult) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            return Ok(serde_json::to_string_pretty(result)?);
        }

        let mut out = String::new();
        let banner = format!(
            "必要性スコア: {} / 100  (緊急度: {})",
            result.score,
            result.urgency.label_ja()
        );
        out.push_str(&self.colorize(&banner, result.urgency));
        out.push('\n');
        out.push_str(&result.interpretation_ja);
        out.push('\n');

        out.push_str(&Self::build_table(
            &["タイミング", "重大度", "将来リスク", "ボーナス"],
            vec![vec![
                format!("{:.1}", result.components.timing),
                format!("{:.1}", result.components.severity),
                format!("{:.1}", result.components.risk),
                format!("{:.1}", result.components.bonus),
            ]],
        ));
        out.push('\n');

        match &result.timing {
            TimingAssessment::Band {
                label_ja,
                recommendation_ja,
                benefit_text_ja,
                ..
            } => {
                out.push_str(&format!(
                    "タイミング評価 [{}] {}: {}\n",
                    label_ja, recommendation_ja, benefit_text_ja
                ));
            }
            TimingAssessment::NoData => {
                out.push_str("タイミング評価: この年齢に対応するデータがありません\n");
            }
        }

        if !result.ranked_findings.is_empty() {
            let rows = result
                .ranked_findings
                .iter()
                .map(|r| {
                    vec![
                        r.issue_name_ja.clone(),
                        r.category.clone(),
                        format!("{:.1}", r.effect_value),
                        r.description_ja.clone(),
                        format!("{:.2}", r.confidence),
                    ]
                })
                .collect();
            out.push_str(&Self::build_table(
                &["問題", "カテゴリ", "効果", "説明", "信頼度"],
                rows,
            ));
            out.push('\n');
        }

        for scenario in &result.scenarios {
            out.push_str(&format!(
                "{}（信頼度 {:.2}）\n  矯正する場合: {}\n  放置した場合: {}\n",
                scenario.timeframe_ja,
                scenario.confidence,
                scenario.with_treatment_ja,
                scenario.without_treatment_ja
            ));
        }

        if let Some(economics) = &result.economics {
            out.push_str(&format!(
                "経済効果 [{}]: 費用 {}円 / 将来削減 {}円 / 正味便益 {}円 (ROI {:.0}%)\n",
                economics.band_ja,
                economics.current_cost,
                economics.future_savings,
                economics.net_benefit,
                economics.roi_percent
            ));
        }

        Ok(out)
    }

    /// Format the age-risk table.
    pub fn format_age_risks(&self, rows: &[AgeRiskProfile]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "age_threshold": r.age_threshold,
                        "risk_type": r.risk_type.as_str(),
                        "risk_value": r.risk_value,
                        "description_ja": r.description_ja,
                        "calculated_from": r.calculated_from.to_delimited(),
                        "confidence": r.confidence.value(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No age-risk rows; run `ortho aggregate` first.".to_string());
        }
        Ok(Self::build_table(
            &["閾値", "リスク種別", "値", "説明", "根拠論文", "信頼度"],
            rows.iter()
                .map(|r| {
                    vec![
                        r.age_threshold.to_string(),
                        r.risk_type.as_str().to_string(),
                        format!("{:.1}", r.risk_value),
                        r.description_ja.clone(),
                        r.calculated_from.to_delimited(),
                        format!("{:.2}", r.confidence.value()),
                    ]
                })
                .collect(),
        ))
    }

    /// Format the treatment-effect table.
    pub fn format_effects(&self, rows: &[(String, IssueTreatmentEffect)]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|(issue_name, r)| {
                    serde_json::json!({
                        "issue": issue_name,
                        "category": r.effect_category.as_str(),
                        "effect_value": r.effect_value,
                        "direction": r.effect_direction.as_str(),
                        "description_ja": r.description_ja,
                        "calculated_from": r.calculated_from.to_delimited(),
                        "confidence": r.confidence.value(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No treatment-effect rows; run `ortho aggregate` first.".to_string());
        }
        Ok(Self::build_table(
            &["問題", "カテゴリ", "効果", "方向", "説明", "信頼度"],
            rows.iter()
                .map(|(issue_name, r)| {
                    vec![
                        issue_name.clone(),
                        r.effect_category.as_str().to_string(),
                        format!("{:.1}", r.effect_value),
                        r.effect_direction.as_str().to_string(),
                        r.description_ja.clone(),
                        format!("{:.2}", r.confidence.value()),
                    ]
                })
                .collect(),
        ))
    }

    /// Format the timing table.
    pub fn format_timing(&self, rows: &[AgeTimingBenefit]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "code": r.band.code,
                        "label_ja": r.band.label_ja,
                        "age_min": r.band.age_min,
                        "age_max": r.band.age_max,
                        "recommendation": r.recommendation_level.as_str(),
                        "timing_score": r.timing_score,
                        "benefit_text_ja": r.benefit_text_ja,
                        "confidence": r.confidence.value(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No timing rows; run `ortho aggregate` first.".to_string());
        }
        Ok(Self::build_table(
            &["年齢帯", "推奨", "スコア", "内容", "信頼度"],
            rows.iter()
                .map(|r| {
                    vec![
                        format!("{} ({}-{})", r.band.label_ja, r.band.age_min, r.band.age_max),
                        r.recommendation_level.label_ja().to_string(),
                        format!("{:.0}", r.timing_score),
                        r.benefit_text_ja.clone(),
                        format!("{:.2}", r.confidence.value()),
                    ]
                })
                .collect(),
        ))
    }

    /// Format the scenario table.
    pub fn format_scenarios(&self, rows: &[FutureScenario]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "timeframe": r.timeframe.code,
                        "years": r.timeframe.years,
                        "age_min": r.age_min,
                        "age_max": r.age_max,
                        "with_treatment_ja": r.with_treatment_ja,
                        "without_treatment_ja": r.without_treatment_ja,
                        "confidence": r.confidence.value(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No scenario rows; run `ortho aggregate` first.".to_string());
        }
        Ok(Self::build_table(
            &["期間", "年齢", "矯正する場合", "放置した場合", "信頼度"],
            rows.iter()
                .map(|r| {
                    vec![
                        r.timeframe.label_ja.clone(),
                        format!("{}-{}", r.age_min, r.age_max),
                        r.with_treatment_ja.clone(),
                        r.without_treatment_ja.clone(),
                        format!("{:.2}", r.confidence.value()),
                    ]
                })
                .collect(),
        ))
    }

    /// Format the economics table.
    pub fn format_economics(&self, rows: &[EconomicImpact]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "code": r.band.code,
                        "label_ja": r.band.label_ja,
                        "current_cost": r.current_cost,
                        "future_savings": r.future_savings,
                        "net_benefit": r.net_benefit(),
                        "roi_percent": r.roi_percent,
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No economic rows; run `ortho aggregate` first.".to_string());
        }
        Ok(Self::build_table(
            &["年齢帯", "費用", "将来削減", "正味便益", "ROI"],
            rows.iter()
                .map(|r| {
                    vec![
                        r.band.label_ja.clone(),
                        format!("{}円", r.current_cost),
                        format!("{}円", r.future_savings),
                        format!("{}円", r.net_benefit()),
                        format!("{:.0}%", r.roi_percent),
                    ]
                })
                .collect(),
        ))
    }

    /// Format the audit-report list.
    pub fn format_reports(&self, rows: &[UserReport]) -> Result<String> {
        if matches!(self.format, CliFormat::Json) {
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id.to_string(),
                        "created_at": r.created_at,
                        "patient_age": r.patient_age,
                        "issue_ids": r.issue_ids.iter().map(|i| i.value()).collect::<Vec<_>>(),
                        "necessity_score": r.necessity_score,
                        "urgency": r.urgency,
                        "notes": r.notes,
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&values)?);
        }
        if rows.is_empty() {
            return Ok("No logged reports.".to_string());
        }
        Ok(Self::build_table(
            &["ID", "作成時刻", "年齢", "スコア", "緊急度", "メモ"],
            rows.iter()
                .map(|r| {
                    vec![
                        r.id.to_string()[..8].to_string(),
                        r.created_at.to_string(),
                        r.patient_age.to_string(),
                        r.necessity_score.to_string(),
                        r.urgency.clone(),
                        r.notes.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        if self.color_enabled {
            format!("✓ {}", message).green().to_string()
        } else {
            format!("✓ {}", message)
        }
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        if self.color_enabled {
            format!("✗ {}", message).red().to_string()
        } else {
            format!("✗ {}", message)
        }
    }
}
