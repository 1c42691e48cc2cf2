//! Paper module - ingested research papers and their evidence levels

use crate::issue::Language;
use crate::PaperId;

/// Ordinal strength-of-study ranking, 1a strongest … 5 weakest.
///
/// The ordering is used to weight aggregation confidence: systematic
/// reviews (1a) contribute more certainty than expert opinion (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceLevel {
    /// Meta-analysis / systematic review
    Ia,
    /// Randomized controlled trial
    Ib,
    /// Cohort study
    IIa,
    /// Case-control study / clinical trial
    IIb,
    /// Cross-sectional or experimental study
    III,
    /// Case report / case series
    IV,
    /// Expert opinion or unknown
    V,
}

impl EvidenceLevel {
    /// Get the level label as stored ("1a" … "5").
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceLevel::Ia => "1a",
            EvidenceLevel::Ib => "1b",
            EvidenceLevel::IIa => "2a",
            EvidenceLevel::IIb => "2b",
            EvidenceLevel::III => "3",
            EvidenceLevel::IV => "4",
            EvidenceLevel::V => "5",
        }
    }

    /// Parse a level label. Unknown labels map to `V`, matching the
    /// upstream ingestion pipeline's handling of unclassified studies.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "1a" => EvidenceLevel::Ia,
            "1b" => EvidenceLevel::Ib,
            "2a" => EvidenceLevel::IIa,
            "2b" => EvidenceLevel::IIb,
            "3" => EvidenceLevel::III,
            "4" => EvidenceLevel::IV,
            _ => EvidenceLevel::V,
        }
    }

    /// Numeric rank for confidence derivation: 1a=6.0 down to 5=1.0.
    ///
    /// Strictly decreasing with weakening evidence; `MAX_RANK` normalizes
    /// the mean rank into [0, 1].
    pub fn rank(&self) -> f64 {
        match self {
            EvidenceLevel::Ia => 6.0,
            EvidenceLevel::Ib => 5.0,
            EvidenceLevel::IIa => 4.0,
            EvidenceLevel::IIb => 3.0,
            EvidenceLevel::III => 2.0,
            EvidenceLevel::IV => 1.5,
            EvidenceLevel::V => 1.0,
        }
    }

    /// The strongest rank value (`Ia`), used for normalization.
    pub const MAX_RANK: f64 = 6.0;

    /// All levels, strongest first.
    pub const ALL: [EvidenceLevel; 7] = [
        EvidenceLevel::Ia,
        EvidenceLevel::Ib,
        EvidenceLevel::IIa,
        EvidenceLevel::IIb,
        EvidenceLevel::III,
        EvidenceLevel::IV,
        EvidenceLevel::V,
    ];
}

/// An ingested research paper.
///
/// Base entity: immutable once imported, except via explicit re-import.
/// DOI, when present, is unique across papers.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Internal row id
    pub id: PaperId,

    /// PubMed identifier, when known
    pub pmid: Option<String>,

    /// DOI, unique when present
    pub doi: Option<String>,

    /// Paper title
    pub title: String,

    /// Author list, verbatim
    pub authors: Option<String>,

    /// Publication year
    pub publication_year: Option<i32>,

    /// Journal name
    pub journal: Option<String>,

    /// Canonical URL
    pub url: Option<String>,

    /// Abstract text
    pub abstract_text: Option<String>,

    /// Free-text keyword field from the source record
    pub keywords: Option<String>,

    /// MeSH terms, comma-separated as supplied upstream
    pub mesh_terms: Option<String>,

    /// Study design label (e.g. "randomized-controlled-trial")
    pub study_type: Option<String>,

    /// Ordinal evidence level
    pub evidence_level: EvidenceLevel,

    /// Number of subjects, when extractable
    pub sample_size: Option<u32>,

    /// Reported confidence interval, verbatim
    pub confidence_interval: Option<String>,

    /// Declared language of the title/abstract
    pub language: Language,
}

/// A paper record prior to insertion (no row id yet).
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaper {
    /// PubMed identifier, when known
    pub pmid: Option<String>,
    /// DOI, unique when present
    pub doi: Option<String>,
    /// Paper title
    pub title: String,
    /// Author list, verbatim
    pub authors: Option<String>,
    /// Publication year
    pub publication_year: Option<i32>,
    /// Journal name
    pub journal: Option<String>,
    /// Canonical URL
    pub url: Option<String>,
    /// Abstract text
    pub abstract_text: Option<String>,
    /// Free-text keyword field
    pub keywords: Option<String>,
    /// MeSH terms
    pub mesh_terms: Option<String>,
    /// Study design label
    pub study_type: Option<String>,
    /// Ordinal evidence level
    pub evidence_level: EvidenceLevel,
    /// Number of subjects
    pub sample_size: Option<u32>,
    /// Reported confidence interval
    pub confidence_interval: Option<String>,
    /// Declared language
    pub language: Language,
}

impl NewPaper {
    /// Create a minimal record with only a title and evidence level.
    pub fn titled(title: impl Into<String>, evidence_level: EvidenceLevel) -> Self {
        Self {
            pmid: None,
            doi: None,
            title: title.into(),
            authors: None,
            publication_year: None,
            journal: None,
            url: None,
            abstract_text: None,
            keywords: None,
            mesh_terms: None,
            study_type: None,
            evidence_level,
            sample_size: None,
            confidence_interval: None,
            language: Language::En,
        }
    }
}
