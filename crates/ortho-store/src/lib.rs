//! OrthoEvidence Storage Layer
//!
//! Implements the `EvidenceStore` trait over SQLite.
//!
//! # Architecture
//!
//! - SQLite for all base and derived evidence tables (schema in `schema.sql`)
//! - Unique constraints double as upsert keys; every derived-table write is a
//!   single `INSERT .. ON CONFLICT .. DO UPDATE` statement, atomic per row
//! - The `calculated_from` audit column is stored as a comma-delimited id
//!   list; the typed `SourceSet` form lives in ortho-domain and the
//!   formatting/parsing happens only here
//!
//! # Examples
//!
//! ```no_run
//! use ortho_store::SqliteStore;
//!
//! let store = SqliteStore::new("ortho_evidence.db").unwrap();
//! // Store is now ready for evidence operations
//! ```
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe. Each thread should have its own
//! `SqliteStore` instance.

#![warn(missing_docs)]

use ortho_domain::traits::EvidenceStore;
use ortho_domain::{
    AgeBand, AgeRange, AgeRiskProfile, AgeTimingBenefit, Confidence, DentalIssue, EconomicImpact,
    EffectCategory, EffectDirection, EvidenceLevel, FindingId, FindingType, FutureScenario,
    IssueId, IssueKeyword, IssueTreatmentEffect, Language, NewDentalIssue, NewPaper,
    NewResearchFinding, Paper, PaperId, PaperIssueRelation, RecommendationLevel, ReportId,
    ResearchFinding, RiskType, SourceSet, Timeframe, UserReport,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Referential or keying integrity violation
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

/// SQLite-based implementation of `EvidenceStore`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new store at the given database path.
    ///
    /// Use [`SqliteStore::in_memory`] for tests.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert ReportId to bytes for storage
    fn report_id_to_bytes(id: ReportId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to ReportId
    fn bytes_to_report_id(bytes: &[u8]) -> Result<ReportId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for ReportId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(ReportId::from_value(u128::from_be_bytes(arr)))
    }

    /// Reject an age band that overlaps an existing band with a different
    /// code in `table`.
    fn check_band_disjoint(&self, table: &str, band: &AgeBand) -> Result<(), StoreError> {
        let sql = format!(
            "SELECT age_group_code FROM {} WHERE age_group_code != ?1 AND age_min <= ?2 AND age_max >= ?3",
            table
        );
        let clash: Option<String> = self
            .conn
            .query_row(
                &sql,
                params![&band.code, band.age_max, band.age_min],
                |row| row.get(0),
            )
            .optional()?;
        match clash {
            Some(other) => Err(StoreError::Integrity(format!(
                "Age band '{}' ({}-{}) overlaps existing band '{}' in {}",
                band.code, band.age_min, band.age_max, other, table
            ))),
            None => Ok(()),
        }
    }
}

/// Format a list of issue ids as the stored comma-delimited form.
fn issue_ids_to_str<'a, I: IntoIterator<Item = &'a IssueId>>(ids: I) -> String {
    let parts: Vec<String> = ids.into_iter().map(|id| id.0.to_string()).collect();
    parts.join(",")
}

/// Parse the stored comma-delimited issue id form.
fn parse_issue_ids(s: &str) -> Result<Vec<IssueId>, StoreError> {
    let mut ids = Vec::new();
    for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let raw: i64 = token.parse().map_err(|_| {
            StoreError::InvalidData(format!("Invalid issue id in list: '{}'", token))
        })?;
        ids.push(IssueId(raw));
    }
    Ok(ids)
}

fn invalid(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(StoreError::InvalidData(msg)),
    )
}

fn map_paper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Paper> {
    let language: String = row.get(15)?;
    let language = Language::parse(&language)
        .ok_or_else(|| invalid(15, format!("Unknown language: {}", language)))?;
    let evidence_level: String = row.get(12)?;

    Ok(Paper {
        id: PaperId(row.get(0)?),
        pmid: row.get(1)?,
        doi: row.get(2)?,
        title: row.get(3)?,
        authors: row.get(4)?,
        publication_year: row.get(5)?,
        journal: row.get(6)?,
        url: row.get(7)?,
        abstract_text: row.get(8)?,
        keywords: row.get(9)?,
        mesh_terms: row.get(10)?,
        study_type: row.get(11)?,
        evidence_level: EvidenceLevel::parse(&evidence_level),
        sample_size: row.get::<_, Option<i64>>(13)?.map(|v| v as u32),
        confidence_interval: row.get(14)?,
        language,
    })
}

fn map_finding(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResearchFinding> {
    let finding_type: String = row.get(3)?;
    let finding_type = FindingType::parse(&finding_type)
        .ok_or_else(|| invalid(3, format!("Unknown finding type: {}", finding_type)))?;
    let direction: String = row.get(6)?;
    let effect_direction = EffectDirection::parse(&direction)
        .ok_or_else(|| invalid(6, format!("Unknown effect direction: {}", direction)))?;

    Ok(ResearchFinding {
        id: FindingId(row.get(0)?),
        paper_id: PaperId(row.get(1)?),
        issue_id: IssueId(row.get(2)?),
        finding_type,
        description_ja: row.get(4)?,
        effect_value: row.get(5)?,
        effect_direction,
        confidence_interval: row.get(7)?,
        p_value: row.get(8)?,
        age_range: AgeRange {
            min: row.get::<_, Option<i64>>(9)?.map(|v| v as u8),
            max: row.get::<_, Option<i64>>(10)?.map(|v| v as u8),
        },
    })
}

fn map_issue(row: &rusqlite::Row<'_>) -> rusqlite::Result<DentalIssue> {
    Ok(DentalIssue {
        id: IssueId(row.get(0)?),
        code: row.get(1)?,
        name_ja: row.get(2)?,
        name_en: row.get(3)?,
        severity_base_score: row.get(4)?,
    })
}

fn map_source_set(idx: usize, raw: String) -> rusqlite::Result<SourceSet> {
    SourceSet::parse_delimited(&raw).map_err(|e| invalid(idx, e))
}

fn map_scenario(row: &rusqlite::Row<'_>) -> rusqlite::Result<FutureScenario> {
    let issue_ids: Option<String> = row.get(7)?;
    let issue_ids = match issue_ids {
        None => None,
        Some(raw) => {
            let ids = parse_issue_ids(&raw).map_err(|e| invalid(7, e.to_string()))?;
            Some(ids.into_iter().collect::<BTreeSet<_>>())
        }
    };
    let sources: String = row.get(8)?;
    Ok(FutureScenario {
        timeframe: Timeframe {
            code: row.get(0)?,
            label_ja: row.get(1)?,
            years: row.get::<_, i64>(2)? as u8,
        },
        age_min: row.get::<_, i64>(3)? as u8,
        age_max: row.get::<_, i64>(4)? as u8,
        with_treatment_ja: row.get(5)?,
        without_treatment_ja: row.get(6)?,
        issue_ids,
        calculated_from: map_source_set(8, sources)?,
        confidence: Confidence::new(row.get(9)?),
    })
}

fn map_economic_impact(row: &rusqlite::Row<'_>) -> rusqlite::Result<EconomicImpact> {
    let sources: String = row.get(8)?;
    Ok(EconomicImpact {
        band: AgeBand {
            code: row.get(0)?,
            label_ja: row.get(1)?,
            age_min: row.get::<_, i64>(2)? as u8,
            age_max: row.get::<_, i64>(3)? as u8,
        },
        current_cost: row.get(4)?,
        future_savings: row.get(5)?,
        roi_percent: row.get(6)?,
        calculation_basis: row.get(7)?,
        calculated_from: map_source_set(8, sources)?,
        confidence: Confidence::new(row.get(9)?),
    })
}

const PAPER_COLUMNS: &str = "paper_id, pmid, doi, title, authors, publication_year, journal, url, \
     abstract, keywords, mesh_terms, study_type, evidence_level, sample_size, \
     confidence_interval, language";

const FINDING_COLUMNS: &str = "finding_id, paper_id, issue_id, finding_type, description_ja, \
     effect_value, effect_direction, confidence_interval, p_value, \
     applies_to_age_min, applies_to_age_max";

impl EvidenceStore for SqliteStore {
    type Error = StoreError;

    fn insert_paper(&mut self, paper: NewPaper) -> Result<PaperId, Self::Error> {
        // DOI is unique across papers; re-importing a known DOI is a no-op
        // that hands back the existing row.
        if let Some(doi) = &paper.doi {
            let existing: Option<i64> = self
                .conn
                .query_row(
                    "SELECT paper_id FROM research_papers WHERE doi = ?1",
                    params![doi],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(id) = existing {
                return Ok(PaperId(id));
            }
        }

        self.conn.execute(
            "INSERT INTO research_papers
             (pmid, doi, title, authors, publication_year, journal, url, abstract,
              keywords, mesh_terms, study_type, evidence_level, sample_size,
              confidence_interval, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                paper.pmid,
                paper.doi,
                paper.title,
                paper.authors,
                paper.publication_year,
                paper.journal,
                paper.url,
                paper.abstract_text,
                paper.keywords,
                paper.mesh_terms,
                paper.study_type,
                paper.evidence_level.as_str(),
                paper.sample_size,
                paper.confidence_interval,
                paper.language.as_str(),
            ],
        )?;

        Ok(PaperId(self.conn.last_insert_rowid()))
    }

    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error> {
        let sql = format!("SELECT {} FROM research_papers WHERE paper_id = ?1", PAPER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id.0], map_paper)
            .optional()?)
    }

    fn find_paper_by_doi(&self, doi: &str) -> Result<Option<Paper>, Self::Error> {
        let sql = format!("SELECT {} FROM research_papers WHERE doi = ?1", PAPER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![doi], map_paper)
            .optional()?)
    }

    fn list_papers(&self) -> Result<Vec<Paper>, Self::Error> {
        let sql = format!("SELECT {} FROM research_papers ORDER BY paper_id", PAPER_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let papers = stmt
            .query_map([], map_paper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(papers)
    }

    fn insert_issue(&mut self, issue: NewDentalIssue) -> Result<IssueId, Self::Error> {
        self.conn.execute(
            "INSERT INTO dental_issues (issue_code, issue_name_ja, issue_name_en, severity_base_score)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                issue.code,
                issue.name_ja,
                issue.name_en,
                issue.severity_base_score
            ],
        )?;
        Ok(IssueId(self.conn.last_insert_rowid()))
    }

    fn get_issue(&self, id: IssueId) -> Result<Option<DentalIssue>, Self::Error> {
        Ok(self
            .conn
            .query_row(
                "SELECT issue_id, issue_code, issue_name_ja, issue_name_en, severity_base_score
                 FROM dental_issues WHERE issue_id = ?1",
                params![id.0],
                map_issue,
            )
            .optional()?)
    }

    fn find_issue_by_code(&self, code: &str) -> Result<Option<DentalIssue>, Self::Error> {
        Ok(self
            .conn
            .query_row(
                "SELECT issue_id, issue_code, issue_name_ja, issue_name_en, severity_base_score
                 FROM dental_issues WHERE issue_code = ?1",
                params![code],
                map_issue,
            )
            .optional()?)
    }

    fn list_issues(&self) -> Result<Vec<DentalIssue>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_id, issue_code, issue_name_ja, issue_name_en, severity_base_score
             FROM dental_issues ORDER BY issue_id",
        )?;
        let issues = stmt
            .query_map([], map_issue)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    fn upsert_keyword(&mut self, keyword: IssueKeyword) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO issue_keywords (issue_id, keyword, language, weight)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(issue_id, keyword, language) DO UPDATE SET
             weight = excluded.weight",
            params![
                keyword.issue_id.0,
                keyword.keyword,
                keyword.language.as_str(),
                keyword.weight
            ],
        )?;
        Ok(())
    }

    fn list_keywords(&self) -> Result<Vec<IssueKeyword>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_id, keyword, language, weight
             FROM issue_keywords ORDER BY keyword_id",
        )?;
        let keywords = stmt
            .query_map([], |row| {
                let language: String = row.get(2)?;
                let language = Language::parse(&language)
                    .ok_or_else(|| invalid(2, format!("Unknown language: {}", language)))?;
                Ok(IssueKeyword {
                    issue_id: IssueId(row.get(0)?),
                    keyword: row.get(1)?,
                    language,
                    weight: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keywords)
    }

    fn insert_finding(&mut self, finding: NewResearchFinding) -> Result<FindingId, Self::Error> {
        self.conn.execute(
            "INSERT INTO research_findings
             (paper_id, issue_id, finding_type, description_ja, effect_value,
              effect_direction, confidence_interval, p_value,
              applies_to_age_min, applies_to_age_max)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                finding.paper_id.0,
                finding.issue_id.0,
                finding.finding_type.as_str(),
                finding.description_ja,
                finding.effect_value,
                finding.effect_direction.as_str(),
                finding.confidence_interval,
                finding.p_value,
                finding.age_range.min,
                finding.age_range.max,
            ],
        )?;
        Ok(FindingId(self.conn.last_insert_rowid()))
    }

    fn list_findings(&self) -> Result<Vec<ResearchFinding>, Self::Error> {
        let sql = format!("SELECT {} FROM research_findings ORDER BY finding_id", FINDING_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let findings = stmt
            .query_map([], map_finding)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(findings)
    }

    fn findings_for_issue(&self, issue: IssueId) -> Result<Vec<ResearchFinding>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM research_findings WHERE issue_id = ?1 ORDER BY finding_id",
            FINDING_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let findings = stmt
            .query_map(params![issue.0], map_finding)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(findings)
    }

    fn replace_paper_relations(
        &mut self,
        paper: PaperId,
        relations: &[PaperIssueRelation],
    ) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;

        if relations.is_empty() {
            tx.execute(
                "DELETE FROM paper_issue_relations WHERE paper_id = ?1",
                params![paper.0],
            )?;
        } else {
            let keep = issue_ids_to_str(relations.iter().map(|r| &r.issue_id));
            // Remove relations to issues no longer classified; instr() keeps
            // this a single statement over the delimited id list.
            tx.execute(
                "DELETE FROM paper_issue_relations
                 WHERE paper_id = ?1
                 AND instr(',' || ?2 || ',', ',' || issue_id || ',') = 0",
                params![paper.0, keep],
            )?;

            for relation in relations {
                if relation.paper_id != paper {
                    return Err(StoreError::Integrity(format!(
                        "Relation paper id {} does not match target paper {}",
                        relation.paper_id, paper
                    )));
                }
                tx.execute(
                    "INSERT INTO paper_issue_relations (paper_id, issue_id, relevance_score, is_primary)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(paper_id, issue_id) DO UPDATE SET
                     relevance_score = excluded.relevance_score,
                     is_primary = excluded.is_primary",
                    params![
                        relation.paper_id.0,
                        relation.issue_id.0,
                        relation.relevance_score,
                        relation.is_primary
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn relations_for_paper(&self, paper: PaperId) -> Result<Vec<PaperIssueRelation>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT paper_id, issue_id, relevance_score, is_primary
             FROM paper_issue_relations WHERE paper_id = ?1 ORDER BY issue_id",
        )?;
        let relations = stmt
            .query_map(params![paper.0], |row| {
                Ok(PaperIssueRelation {
                    paper_id: PaperId(row.get(0)?),
                    issue_id: IssueId(row.get(1)?),
                    relevance_score: row.get(2)?,
                    is_primary: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relations)
    }

    fn upsert_age_risk_profile(&mut self, row: &AgeRiskProfile) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO age_risk_profiles
             (age_threshold, risk_type, risk_value, description_ja, calculated_from, confidence_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(age_threshold, risk_type) DO UPDATE SET
             risk_value = excluded.risk_value,
             description_ja = excluded.description_ja,
             calculated_from = excluded.calculated_from,
             confidence_level = excluded.confidence_level",
            params![
                row.age_threshold,
                row.risk_type.as_str(),
                row.risk_value,
                row.description_ja,
                row.calculated_from.to_delimited(),
                row.confidence.value(),
            ],
        )?;
        Ok(())
    }

    fn upsert_treatment_effect(&mut self, row: &IssueTreatmentEffect) -> Result<(), Self::Error> {
        self.conn
            .execute(
                "INSERT INTO issue_treatment_effects
                 (issue_id, effect_category, effect_value, effect_direction,
                  description_ja, calculated_from, confidence_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(issue_id, effect_category) DO UPDATE SET
                 effect_value = excluded.effect_value,
                 effect_direction = excluded.effect_direction,
                 description_ja = excluded.description_ja,
                 calculated_from = excluded.calculated_from,
                 confidence_level = excluded.confidence_level",
                params![
                    row.issue_id.0,
                    row.effect_category.as_str(),
                    row.effect_value,
                    row.effect_direction.as_str(),
                    row.description_ja,
                    row.calculated_from.to_delimited(),
                    row.confidence.value(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, msg)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::Integrity(format!(
                        "Treatment effect references unknown issue {}: {}",
                        row.issue_id,
                        msg.unwrap_or_default()
                    ))
                }
                other => StoreError::Database(other),
            })?;
        Ok(())
    }

    fn upsert_timing_benefit(&mut self, row: &AgeTimingBenefit) -> Result<(), Self::Error> {
        self.check_band_disjoint("age_timing_benefits", &row.band)?;
        self.conn.execute(
            "INSERT INTO age_timing_benefits
             (age_group_code, age_group_ja, age_min, age_max, benefit_text_ja,
              recommendation_level, timing_score, calculated_from, confidence_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(age_group_code) DO UPDATE SET
             age_group_ja = excluded.age_group_ja,
             age_min = excluded.age_min,
             age_max = excluded.age_max,
             benefit_text_ja = excluded.benefit_text_ja,
             recommendation_level = excluded.recommendation_level,
             timing_score = excluded.timing_score,
             calculated_from = excluded.calculated_from,
             confidence_level = excluded.confidence_level",
            params![
                row.band.code,
                row.band.label_ja,
                row.band.age_min,
                row.band.age_max,
                row.benefit_text_ja,
                row.recommendation_level.as_str(),
                row.timing_score,
                row.calculated_from.to_delimited(),
                row.confidence.value(),
            ],
        )?;
        Ok(())
    }

    fn upsert_future_scenario(&mut self, row: &FutureScenario) -> Result<(), Self::Error> {
        let issue_ids = row
            .issue_ids
            .as_ref()
            .map(|ids| issue_ids_to_str(ids.iter()));
        self.conn.execute(
            "INSERT INTO future_scenarios
             (timeframe_code, timeframe_ja, timeframe_years, applies_to_age_min,
              applies_to_age_max, with_ortho_text_ja, without_ortho_text_ja,
              issue_ids, calculated_from, confidence_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(timeframe_code, applies_to_age_min, applies_to_age_max) DO UPDATE SET
             timeframe_ja = excluded.timeframe_ja,
             timeframe_years = excluded.timeframe_years,
             with_ortho_text_ja = excluded.with_ortho_text_ja,
             without_ortho_text_ja = excluded.without_ortho_text_ja,
             issue_ids = excluded.issue_ids,
             calculated_from = excluded.calculated_from,
             confidence_level = excluded.confidence_level",
            params![
                row.timeframe.code,
                row.timeframe.label_ja,
                row.timeframe.years,
                row.age_min,
                row.age_max,
                row.with_treatment_ja,
                row.without_treatment_ja,
                issue_ids,
                row.calculated_from.to_delimited(),
                row.confidence.value(),
            ],
        )?;
        Ok(())
    }

    fn upsert_economic_impact(&mut self, row: &EconomicImpact) -> Result<(), Self::Error> {
        self.check_band_disjoint("economic_impacts", &row.band)?;
        self.conn.execute(
            "INSERT INTO economic_impacts
             (age_group_code, age_group_ja, age_min, age_max, current_cost,
              future_savings, roi, calculation_basis, calculated_from, confidence_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(age_group_code) DO UPDATE SET
             age_group_ja = excluded.age_group_ja,
             age_min = excluded.age_min,
             age_max = excluded.age_max,
             current_cost = excluded.current_cost,
             future_savings = excluded.future_savings,
             roi = excluded.roi,
             calculation_basis = excluded.calculation_basis,
             calculated_from = excluded.calculated_from,
             confidence_level = excluded.confidence_level",
            params![
                row.band.code,
                row.band.label_ja,
                row.band.age_min,
                row.band.age_max,
                row.current_cost,
                row.future_savings,
                row.roi_percent,
                row.calculation_basis,
                row.calculated_from.to_delimited(),
                row.confidence.value(),
            ],
        )?;
        Ok(())
    }

    fn age_risk_profiles(&self) -> Result<Vec<AgeRiskProfile>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT age_threshold, risk_type, risk_value, description_ja,
                    calculated_from, confidence_level
             FROM age_risk_profiles ORDER BY age_threshold, risk_type",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let risk_type: String = row.get(1)?;
                let risk_type = RiskType::parse(&risk_type)
                    .ok_or_else(|| invalid(1, format!("Unknown risk type: {}", risk_type)))?;
                let sources: String = row.get(4)?;
                Ok(AgeRiskProfile {
                    age_threshold: row.get::<_, i64>(0)? as u8,
                    risk_type,
                    risk_value: row.get(2)?,
                    description_ja: row.get(3)?,
                    calculated_from: map_source_set(4, sources)?,
                    confidence: Confidence::new(row.get(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn treatment_effects_for_issue(
        &self,
        issue: IssueId,
    ) -> Result<Vec<IssueTreatmentEffect>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_id, effect_category, effect_value, effect_direction,
                    description_ja, calculated_from, confidence_level
             FROM issue_treatment_effects
             WHERE issue_id = ?1
             ORDER BY effect_value DESC",
        )?;
        let rows = stmt
            .query_map(params![issue.0], |row| {
                let category: String = row.get(1)?;
                let effect_category = EffectCategory::parse(&category)
                    .ok_or_else(|| invalid(1, format!("Unknown effect category: {}", category)))?;
                let direction: String = row.get(3)?;
                let effect_direction = EffectDirection::parse(&direction)
                    .ok_or_else(|| invalid(3, format!("Unknown effect direction: {}", direction)))?;
                let sources: String = row.get(5)?;
                Ok(IssueTreatmentEffect {
                    issue_id: IssueId(row.get(0)?),
                    effect_category,
                    effect_value: row.get(2)?,
                    effect_direction,
                    description_ja: row.get(4)?,
                    calculated_from: map_source_set(5, sources)?,
                    confidence: Confidence::new(row.get(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn timing_benefits(&self) -> Result<Vec<AgeTimingBenefit>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT age_group_code, age_group_ja, age_min, age_max, benefit_text_ja,
                    recommendation_level, timing_score, calculated_from, confidence_level
             FROM age_timing_benefits ORDER BY age_min",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let level: String = row.get(5)?;
                let recommendation_level = RecommendationLevel::parse(&level)
                    .ok_or_else(|| invalid(5, format!("Unknown recommendation level: {}", level)))?;
                let sources: String = row.get(7)?;
                Ok(AgeTimingBenefit {
                    band: AgeBand {
                        code: row.get(0)?,
                        label_ja: row.get(1)?,
                        age_min: row.get::<_, i64>(2)? as u8,
                        age_max: row.get::<_, i64>(3)? as u8,
                    },
                    benefit_text_ja: row.get(4)?,
                    recommendation_level,
                    timing_score: row.get(6)?,
                    calculated_from: map_source_set(7, sources)?,
                    confidence: Confidence::new(row.get(8)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_scenarios(&self) -> Result<Vec<FutureScenario>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT timeframe_code, timeframe_ja, timeframe_years, applies_to_age_min,
                    applies_to_age_max, with_ortho_text_ja, without_ortho_text_ja,
                    issue_ids, calculated_from, confidence_level
             FROM future_scenarios
             ORDER BY timeframe_years, applies_to_age_min",
        )?;
        let rows = stmt
            .query_map([], map_scenario)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn scenarios_for_age(&self, age: u8) -> Result<Vec<FutureScenario>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT timeframe_code, timeframe_ja, timeframe_years, applies_to_age_min,
                    applies_to_age_max, with_ortho_text_ja, without_ortho_text_ja,
                    issue_ids, calculated_from, confidence_level
             FROM future_scenarios
             WHERE applies_to_age_min <= ?1 AND applies_to_age_max >= ?1
             ORDER BY timeframe_years",
        )?;
        let rows = stmt
            .query_map(params![age], map_scenario)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn economic_impacts(&self) -> Result<Vec<EconomicImpact>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT age_group_code, age_group_ja, age_min, age_max, current_cost,
                    future_savings, roi, calculation_basis, calculated_from, confidence_level
             FROM economic_impacts ORDER BY age_min",
        )?;
        let rows = stmt
            .query_map([], map_economic_impact)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn economic_impact_for_age(&self, age: u8) -> Result<Option<EconomicImpact>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT age_group_code, age_group_ja, age_min, age_max, current_cost,
                        future_savings, roi, calculation_basis, calculated_from, confidence_level
                 FROM economic_impacts
                 WHERE age_min <= ?1 AND age_max >= ?1",
                params![age],
                map_economic_impact,
            )
            .optional()?;
        Ok(row)
    }

    fn append_report(&mut self, report: &UserReport) -> Result<ReportId, Self::Error> {
        let id_bytes = Self::report_id_to_bytes(report.id);
        self.conn.execute(
            "INSERT INTO user_reports
             (report_id, created_at, patient_age, issue_ids, necessity_score,
              urgency, result_json, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &id_bytes,
                report.created_at as i64,
                report.patient_age,
                issue_ids_to_str(report.issue_ids.iter()),
                report.necessity_score,
                report.urgency,
                report.result_json,
                report.notes,
            ],
        )?;
        Ok(report.id)
    }

    fn list_reports(&self) -> Result<Vec<UserReport>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT report_id, created_at, patient_age, issue_ids, necessity_score,
                    urgency, result_json, notes
             FROM user_reports ORDER BY report_id",
        )?;
        let reports = stmt
            .query_map([], |row| {
                let id_bytes: Vec<u8> = row.get(0)?;
                let id = Self::bytes_to_report_id(&id_bytes).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Blob,
                        Box::new(e),
                    )
                })?;
                let issue_ids: String = row.get(3)?;
                let issue_ids =
                    parse_issue_ids(&issue_ids).map_err(|e| invalid(3, e.to_string()))?;
                Ok(UserReport {
                    id,
                    created_at: row.get::<_, i64>(1)? as u64,
                    patient_age: row.get::<_, i64>(2)? as u8,
                    issue_ids,
                    necessity_score: row.get::<_, i64>(4)? as u8,
                    urgency: row.get(5)?,
                    result_json: row.get(6)?,
                    notes: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }
}
