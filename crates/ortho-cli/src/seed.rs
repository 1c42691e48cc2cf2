//! Built-in reference data: the dental issues and their classification
//! keywords.
//!
//! Issues are append-only reference data; seeding skips codes that already
//! exist so `init` can run repeatedly. Keywords are keyed upserts.

use crate::error::{CliError, Result};
use ortho_domain::traits::EvidenceStore;
use ortho_domain::{IssueKeyword, Language, NewDentalIssue};
use ortho_store::SqliteStore;

/// One seed entry: issue definition plus its weighted keywords.
struct SeedIssue {
    code: &'static str,
    name_ja: &'static str,
    name_en: &'static str,
    severity: f64,
    keywords_en: &'static [(&'static str, f64)],
    keywords_ja: &'static [(&'static str, f64)],
}

const SEED_ISSUES: &[SeedIssue] = &[
    SeedIssue {
        code: "crowding",
        name_ja: "叢生",
        name_en: "Crowding",
        severity: 70.0,
        keywords_en: &[
            ("crowding", 1.0),
            ("dental crowding", 1.1),
            ("tooth crowding", 1.0),
            ("malocclusion", 0.5),
        ],
        keywords_ja: &[("叢生", 1.0), ("乱ぐい歯", 0.8)],
    },
    SeedIssue {
        code: "open_bite",
        name_ja: "開咬",
        name_en: "Open bite",
        severity: 75.0,
        keywords_en: &[
            ("open bite", 1.0),
            ("anterior open bite", 1.1),
            ("open occlusion", 0.8),
        ],
        keywords_ja: &[("開咬", 1.0)],
    },
    SeedIssue {
        code: "deep_bite",
        name_ja: "過蓋咬合",
        name_en: "Deep bite",
        severity: 65.0,
        keywords_en: &[("deep bite", 1.0), ("overbite", 0.9), ("deep overbite", 1.1)],
        keywords_ja: &[("過蓋咬合", 1.0)],
    },
    SeedIssue {
        code: "crossbite",
        name_ja: "交叉咬合",
        name_en: "Crossbite",
        severity: 80.0,
        keywords_en: &[
            ("crossbite", 1.0),
            ("cross bite", 1.0),
            ("cross-bite", 1.0),
            ("posterior crossbite", 1.1),
        ],
        keywords_ja: &[("交叉咬合", 1.0)],
    },
    SeedIssue {
        code: "maxillary_protrusion",
        name_ja: "上顎前突",
        name_en: "Maxillary protrusion",
        severity: 72.0,
        keywords_en: &[
            ("overjet", 0.9),
            ("maxillary protrusion", 1.1),
            ("class ii malocclusion", 1.0),
            ("maxillary prognathism", 1.0),
        ],
        keywords_ja: &[("上顎前突", 1.0), ("出っ歯", 0.8)],
    },
    SeedIssue {
        code: "mandibular_protrusion",
        name_ja: "下顎前突",
        name_en: "Mandibular protrusion",
        severity: 85.0,
        keywords_en: &[
            ("underbite", 0.9),
            ("mandibular prognathism", 1.1),
            ("class iii malocclusion", 1.0),
            ("mandibular protrusion", 1.0),
        ],
        keywords_ja: &[("下顎前突", 1.0), ("受け口", 0.8)],
    },
    SeedIssue {
        code: "other",
        name_ja: "その他の歯列問題",
        name_en: "Other alignment problem",
        severity: 50.0,
        keywords_en: &[],
        keywords_ja: &[],
    },
];

/// Seed the reference issues and keywords. Returns the number of issues
/// newly created.
pub fn seed_reference_data(store: &mut SqliteStore) -> Result<usize> {
    let mut created = 0;
    for seed in SEED_ISSUES {
        let issue_id = match store.find_issue_by_code(seed.code)? {
            Some(existing) => existing.id,
            None => {
                created += 1;
                store.insert_issue(NewDentalIssue {
                    code: seed.code.to_string(),
                    name_ja: seed.name_ja.to_string(),
                    name_en: seed.name_en.to_string(),
                    severity_base_score: seed.severity,
                })?
            }
        };

        for (keyword, weight) in seed.keywords_en {
            store.upsert_keyword(IssueKeyword::new(issue_id, *keyword, Language::En, *weight))?;
        }
        for (keyword, weight) in seed.keywords_ja {
            store.upsert_keyword(IssueKeyword::new(issue_id, *keyword, Language::Ja, *weight))?;
        }
    }
    Ok(created)
}

/// Resolve an issue selector (stable code or numeric id) to an issue id.
pub fn resolve_issue(store: &SqliteStore, selector: &str) -> Result<ortho_domain::IssueId> {
    if let Ok(raw) = selector.parse::<i64>() {
        let id = ortho_domain::IssueId(raw);
        if store.get_issue(id)?.is_some() {
            return Ok(id);
        }
        return Err(CliError::InvalidInput(format!("Unknown issue id: {}", raw)));
    }

    store
        .find_issue_by_code(selector)?
        .map(|issue| issue.id)
        .ok_or_else(|| CliError::InvalidInput(format!("Unknown issue code: '{}'", selector)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_repeatable() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(seed_reference_data(&mut store).unwrap(), SEED_ISSUES.len());
        assert_eq!(seed_reference_data(&mut store).unwrap(), 0);
        assert_eq!(store.list_issues().unwrap().len(), SEED_ISSUES.len());
    }

    #[test]
    fn test_resolve_by_code_and_id() {
        let mut store = SqliteStore::in_memory().unwrap();
        seed_reference_data(&mut store).unwrap();

        let by_code = resolve_issue(&store, "crowding").unwrap();
        let by_id = resolve_issue(&store, &by_code.value().to_string()).unwrap();
        assert_eq!(by_code, by_id);

        assert!(resolve_issue(&store, "no_such_issue").is_err());
        assert!(resolve_issue(&store, "9999").is_err());
    }
}
