//! Integration tests for ortho-store
//!
//! These tests verify the full cycle for base entities, relation
//! replacement, derived-table upserts, and the audit log.

use ortho_domain::traits::EvidenceStore;
use ortho_domain::{
    AgeBand, AgeRange, AgeRiskProfile, AgeTimingBenefit, Confidence, EconomicImpact,
    EffectCategory, EffectDirection, EvidenceLevel, FindingType, FutureScenario, IssueId,
    IssueKeyword, IssueTreatmentEffect, Language, NewDentalIssue, NewPaper, NewResearchFinding,
    PaperId, PaperIssueRelation, RecommendationLevel, ReportId, RiskType, SourceSet, Timeframe,
    UserReport,
};
use ortho_store::SqliteStore;

fn new_issue(store: &mut SqliteStore, code: &str, severity: f64) -> IssueId {
    store
        .insert_issue(NewDentalIssue {
            code: code.to_string(),
            name_ja: format!("{}-ja", code),
            name_en: format!("{}-en", code),
            severity_base_score: severity,
        })
        .unwrap()
}

fn band(code: &str, min: u8, max: u8) -> AgeBand {
    AgeBand {
        code: code.to_string(),
        label_ja: format!("{}-label", code),
        age_min: min,
        age_max: max,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_on_disk_store_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evidence.db");

    let issue_id = {
        let mut store = SqliteStore::new(&path).unwrap();
        new_issue(&mut store, "crowding", 70.0)
    };

    let store = SqliteStore::new(&path).unwrap();
    let issue = store.get_issue(issue_id).unwrap().unwrap();
    assert_eq!(issue.code, "crowding");
}

#[test]
fn test_insert_and_get_paper() {
    let mut store = SqliteStore::in_memory().unwrap();

    let mut paper = NewPaper::titled("Crowding and caries", EvidenceLevel::Ib);
    paper.doi = Some("10.1000/xyz".to_string());
    paper.sample_size = Some(240);
    paper.language = Language::En;

    let id = store.insert_paper(paper).unwrap();
    let fetched = store.get_paper(id).unwrap().unwrap();
    assert_eq!(fetched.title, "Crowding and caries");
    assert_eq!(fetched.evidence_level, EvidenceLevel::Ib);
    assert_eq!(fetched.sample_size, Some(240));
}

#[test]
fn test_doi_reimport_returns_existing_id() {
    let mut store = SqliteStore::in_memory().unwrap();

    let mut first = NewPaper::titled("Original", EvidenceLevel::IIa);
    first.doi = Some("10.1000/dup".to_string());
    let first_id = store.insert_paper(first).unwrap();

    let mut second = NewPaper::titled("Re-import with different title", EvidenceLevel::V);
    second.doi = Some("10.1000/dup".to_string());
    let second_id = store.insert_paper(second).unwrap();

    assert_eq!(first_id, second_id);
    // Existing record is untouched
    let fetched = store.find_paper_by_doi("10.1000/dup").unwrap().unwrap();
    assert_eq!(fetched.title, "Original");
    assert_eq!(store.list_papers().unwrap().len(), 1);
}

#[test]
fn test_keyword_upsert_by_triple() {
    let mut store = SqliteStore::in_memory().unwrap();
    let issue = new_issue(&mut store, "crowding", 70.0);

    store
        .upsert_keyword(IssueKeyword::new(issue, "crowding", Language::En, 1.0))
        .unwrap();
    store
        .upsert_keyword(IssueKeyword::new(issue, "crowding", Language::En, 1.4))
        .unwrap();

    let keywords = store.list_keywords().unwrap();
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].weight, 1.4);
}

#[test]
fn test_finding_roundtrip_with_open_age_range() {
    let mut store = SqliteStore::in_memory().unwrap();
    let issue = new_issue(&mut store, "open_bite", 65.0);
    let paper = store
        .insert_paper(NewPaper::titled("Open bite outcomes", EvidenceLevel::IIb))
        .unwrap();

    store
        .insert_finding(NewResearchFinding {
            paper_id: paper,
            issue_id: issue,
            finding_type: FindingType::Risk,
            description_ja: Some("発音障害リスク上昇".to_string()),
            effect_value: 42.0,
            effect_direction: EffectDirection::Increase,
            confidence_interval: Some("1.2-3.4".to_string()),
            p_value: Some(0.01),
            age_range: AgeRange { min: Some(13), max: None },
        })
        .unwrap();

    let findings = store.findings_for_issue(issue).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].age_range.min, Some(13));
    assert_eq!(findings[0].age_range.max, None);
    assert_eq!(findings[0].finding_type, FindingType::Risk);
}

#[test]
fn test_finding_rejects_unknown_issue() {
    let mut store = SqliteStore::in_memory().unwrap();
    let paper = store
        .insert_paper(NewPaper::titled("Orphan finding", EvidenceLevel::III))
        .unwrap();

    let result = store.insert_finding(NewResearchFinding {
        paper_id: paper,
        issue_id: IssueId(999),
        finding_type: FindingType::Benefit,
        description_ja: None,
        effect_value: 10.0,
        effect_direction: EffectDirection::Decrease,
        confidence_interval: None,
        p_value: None,
        age_range: AgeRange::all(),
    });
    assert!(result.is_err(), "Foreign keys should reject unknown issues");
}

#[test]
fn test_replace_paper_relations_replaces_not_appends() {
    let mut store = SqliteStore::in_memory().unwrap();
    let crowding = new_issue(&mut store, "crowding", 70.0);
    let open_bite = new_issue(&mut store, "open_bite", 65.0);
    let crossbite = new_issue(&mut store, "crossbite", 80.0);
    let paper = store
        .insert_paper(NewPaper::titled("Multi-issue study", EvidenceLevel::Ia))
        .unwrap();

    store
        .replace_paper_relations(
            paper,
            &[
                PaperIssueRelation::new(paper, crowding, 0.6, true),
                PaperIssueRelation::new(paper, open_bite, 0.3, false),
            ],
        )
        .unwrap();

    // Re-classification: crowding score changes, open_bite drops out,
    // crossbite appears.
    store
        .replace_paper_relations(
            paper,
            &[
                PaperIssueRelation::new(paper, crowding, 0.4, false),
                PaperIssueRelation::new(paper, crossbite, 0.7, true),
            ],
        )
        .unwrap();

    let relations = store.relations_for_paper(paper).unwrap();
    assert_eq!(relations.len(), 2, "exactly one row per (paper, issue)");
    assert!(relations.iter().any(|r| r.issue_id == crowding && !r.is_primary));
    assert!(relations.iter().any(|r| r.issue_id == crossbite && r.is_primary));
    assert!(!relations.iter().any(|r| r.issue_id == open_bite));
}

#[test]
fn test_replace_with_empty_set_clears() {
    let mut store = SqliteStore::in_memory().unwrap();
    let crowding = new_issue(&mut store, "crowding", 70.0);
    let paper = store
        .insert_paper(NewPaper::titled("Unclassifiable", EvidenceLevel::V))
        .unwrap();

    store
        .replace_paper_relations(paper, &[PaperIssueRelation::new(paper, crowding, 0.5, true)])
        .unwrap();
    store.replace_paper_relations(paper, &[]).unwrap();

    assert!(store.relations_for_paper(paper).unwrap().is_empty());
}

#[test]
fn test_derived_upsert_is_idempotent() {
    let mut store = SqliteStore::in_memory().unwrap();

    let row = AgeRiskProfile {
        age_threshold: 18,
        risk_type: RiskType::ToothLoss,
        risk_value: 34.5,
        description_ja: "18歳までに矯正を行わない場合のリスク".to_string(),
        calculated_from: SourceSet::from_ids([PaperId(1), PaperId(2)]),
        confidence: Confidence::new(0.62),
    };

    store.upsert_age_risk_profile(&row).unwrap();
    store.upsert_age_risk_profile(&row).unwrap();

    let rows = store.age_risk_profiles().unwrap();
    assert_eq!(rows.len(), 1, "upsert must not accumulate rows");
    assert_eq!(rows[0], row, "row must round-trip byte-identically");
}

#[test]
fn test_treatment_effect_upsert_and_ordering() {
    let mut store = SqliteStore::in_memory().unwrap();
    let issue = new_issue(&mut store, "crowding", 70.0);

    for (category, value) in [
        (EffectCategory::CariesRisk, 38.0),
        (EffectCategory::PeriodontalRisk, 45.0),
    ] {
        store
            .upsert_treatment_effect(&IssueTreatmentEffect {
                issue_id: issue,
                effect_category: category,
                effect_value: value,
                effect_direction: EffectDirection::Decrease,
                description_ja: "矯正による改善".to_string(),
                calculated_from: SourceSet::from_ids([PaperId(7)]),
                confidence: Confidence::new(0.5),
            })
            .unwrap();
    }

    let rows = store.treatment_effects_for_issue(issue).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].effect_value >= rows[1].effect_value, "strongest first");
}

#[test]
fn test_timing_band_overlap_rejected() {
    let mut store = SqliteStore::in_memory().unwrap();

    let base = AgeTimingBenefit {
        band: band("pediatric", 7, 12),
        benefit_text_ja: "骨格の成長を利用した効率的な矯正が可能。".to_string(),
        recommendation_level: RecommendationLevel::Optimal,
        timing_score: 100.0,
        calculated_from: SourceSet::new(),
        confidence: Confidence::new(0.7),
    };
    store.upsert_timing_benefit(&base).unwrap();

    // Same code re-upserted: fine.
    store.upsert_timing_benefit(&base).unwrap();
    assert_eq!(store.timing_benefits().unwrap().len(), 1);

    // Different code overlapping 7-12: integrity violation.
    let overlapping = AgeTimingBenefit {
        band: band("adolescent", 12, 18),
        recommendation_level: RecommendationLevel::Recommended,
        timing_score: 80.0,
        ..base.clone()
    };
    assert!(store.upsert_timing_benefit(&overlapping).is_err());

    // Disjoint band: accepted; gaps are legal.
    let disjoint = AgeTimingBenefit {
        band: band("adult", 19, 35),
        recommendation_level: RecommendationLevel::Suitable,
        timing_score: 60.0,
        ..base
    };
    store.upsert_timing_benefit(&disjoint).unwrap();
    assert_eq!(store.timing_benefits().unwrap().len(), 2);
}

#[test]
fn test_scenarios_filtered_and_ordered_by_horizon() {
    let mut store = SqliteStore::in_memory().unwrap();

    for (code, years) in [("10year", 10u8), ("5year", 5u8)] {
        store
            .upsert_future_scenario(&FutureScenario {
                timeframe: Timeframe {
                    code: code.to_string(),
                    label_ja: format!("{}年後", years),
                    years,
                },
                age_min: 7,
                age_max: 18,
                with_treatment_ja: "歯並びが改善され、清掃性が向上。".to_string(),
                without_treatment_ja: "歯列不正が継続。".to_string(),
                issue_ids: None,
                calculated_from: SourceSet::new(),
                confidence: Confidence::new(0.8),
            })
            .unwrap();
    }
    // Out-of-range row must not surface.
    store
        .upsert_future_scenario(&FutureScenario {
            timeframe: Timeframe {
                code: "5year".to_string(),
                label_ja: "5年後".to_string(),
                years: 5,
            },
            age_min: 41,
            age_max: 100,
            with_treatment_ja: String::new(),
            without_treatment_ja: String::new(),
            issue_ids: None,
            calculated_from: SourceSet::new(),
            confidence: Confidence::new(0.8),
        })
        .unwrap();

    let scenarios = store.scenarios_for_age(12).unwrap();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].timeframe.years, 5);
    assert_eq!(scenarios[1].timeframe.years, 10);

    assert_eq!(store.list_scenarios().unwrap().len(), 3);
}

#[test]
fn test_scenario_issue_set_roundtrip() {
    let mut store = SqliteStore::in_memory().unwrap();
    let crowding = new_issue(&mut store, "crowding", 70.0);

    let scenario = FutureScenario {
        timeframe: Timeframe {
            code: "20year".to_string(),
            label_ja: "20年後".to_string(),
            years: 20,
        },
        age_min: 19,
        age_max: 40,
        with_treatment_ja: "良好。".to_string(),
        without_treatment_ja: "悪化。".to_string(),
        issue_ids: Some([crowding].into_iter().collect()),
        calculated_from: SourceSet::from_ids([PaperId(3)]),
        confidence: Confidence::new(0.4),
    };
    store.upsert_future_scenario(&scenario).unwrap();

    let fetched = store.scenarios_for_age(25).unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], scenario);
}

#[test]
fn test_economic_impact_lookup() {
    let mut store = SqliteStore::in_memory().unwrap();

    store
        .upsert_economic_impact(&EconomicImpact {
            band: band("young_adult", 19, 35),
            current_cost: 400_000,
            future_savings: 900_000,
            roi_percent: 125.0,
            calculation_basis: "医療費削減推計".to_string(),
            calculated_from: SourceSet::new(),
            confidence: Confidence::new(0.7),
        })
        .unwrap();

    let hit = store.economic_impact_for_age(25).unwrap().unwrap();
    assert_eq!(hit.current_cost, 400_000);
    assert_eq!(hit.net_benefit(), 500_000);

    assert!(store.economic_impact_for_age(10).unwrap().is_none());
    assert_eq!(store.economic_impacts().unwrap().len(), 1);
}

#[test]
fn test_report_log_append_only_and_ordered() {
    let mut store = SqliteStore::in_memory().unwrap();

    for (i, score) in [55u8, 78u8].iter().enumerate() {
        let report = UserReport {
            id: ReportId::new(),
            created_at: 1_700_000_000 + i as u64,
            patient_age: 25,
            issue_ids: vec![IssueId(1), IssueId(2)],
            necessity_score: *score,
            urgency: "高".to_string(),
            result_json: format!("{{\"score\":{}}}", score),
            notes: None,
        };
        store.append_report(&report).unwrap();
    }

    let reports = store.list_reports().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].id < reports[1].id, "UUIDv7 ids keep log order");
    assert_eq!(reports[0].necessity_score, 55);
    assert_eq!(reports[0].issue_ids, vec![IssueId(1), IssueId(2)]);
}
