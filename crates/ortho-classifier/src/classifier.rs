//! Weighted keyword classification logic

use crate::{ClassifierConfig, ClassifierError};
use ortho_domain::traits::EvidenceStore;
use ortho_domain::{DentalIssue, IssueId, IssueKeyword, Language, Paper, PaperIssueRelation};

/// Relevance of one issue for one paper.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRelevance {
    /// The scored issue
    pub issue_id: IssueId,
    /// Normalized relevance in [0, 1]
    pub score: f64,
}

/// Outcome of classifying one paper.
///
/// Zero qualifying issues is a valid outcome (the paper stays stored but
/// unclassified), not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Qualifying relations, ready for storage
    pub relations: Vec<PaperIssueRelation>,
    /// The single highest-relevance issue, if any qualified
    pub primary: Option<IssueId>,
}

impl Classification {
    /// Whether any issue qualified.
    pub fn is_classified(&self) -> bool {
        !self.relations.is_empty()
    }
}

/// Score every issue's relevance for a paper.
///
/// Pure function: for each issue, the weights of its keywords (in the
/// paper's language, falling back to the configured fallback language when
/// the paper's language has none for that issue) that occur as
/// case-insensitive substrings of the concatenated title, abstract, and
/// keyword field are summed and divided by the issue's total keyword weight
/// for the chosen language. Issues with no keywords score zero.
///
/// Returned in issue input order; every issue gets an entry.
pub fn relevance_scores(
    paper: &Paper,
    issues: &[DentalIssue],
    keywords: &[IssueKeyword],
    config: &ClassifierConfig,
) -> Vec<IssueRelevance> {
    let haystack = classification_text(paper);

    issues
        .iter()
        .map(|issue| IssueRelevance {
            issue_id: issue.id,
            score: issue_score(&haystack, issue.id, paper.language, keywords, config),
        })
        .collect()
}

/// Concatenated, lowercased classification text for a paper.
fn classification_text(paper: &Paper) -> String {
    let mut text = paper.title.clone();
    if let Some(abstract_text) = &paper.abstract_text {
        text.push(' ');
        text.push_str(abstract_text);
    }
    if let Some(keywords) = &paper.keywords {
        text.push(' ');
        text.push_str(keywords);
    }
    text.to_lowercase()
}

fn issue_score(
    haystack: &str,
    issue: IssueId,
    paper_language: Language,
    keywords: &[IssueKeyword],
    config: &ClassifierConfig,
) -> f64 {
    let in_language = |language: Language| {
        keywords
            .iter()
            .filter(move |kw| kw.issue_id == issue && kw.language == language)
    };

    let mut candidates: Vec<&IssueKeyword> = in_language(paper_language).collect();
    if candidates.is_empty() {
        candidates = in_language(config.fallback_language).collect();
    }

    let total_weight: f64 = candidates.iter().map(|kw| kw.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let matched_weight: f64 = candidates
        .iter()
        .filter(|kw| haystack.contains(&kw.keyword.to_lowercase()))
        .map(|kw| kw.weight)
        .sum();

    matched_weight / total_weight
}

/// The issue classifier.
///
/// Holds the qualification threshold; the matching itself is delegated to
/// [`relevance_scores`].
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier with the given configuration.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Create a classifier with default configuration.
    pub fn default_config() -> Self {
        Self::new(ClassifierConfig::default())
    }

    /// Classify a paper against the issue and keyword tables.
    ///
    /// The issue with the highest qualifying score is marked primary; ties
    /// break deterministically to the lowest issue id (creation order).
    pub fn classify(
        &self,
        paper: &Paper,
        issues: &[DentalIssue],
        keywords: &[IssueKeyword],
    ) -> Classification {
        let mut qualifying: Vec<IssueRelevance> =
            relevance_scores(paper, issues, keywords, &self.config)
                .into_iter()
                .filter(|r| r.score > self.config.relevance_threshold)
                .collect();

        // Total order: score descending, then id ascending for ties.
        qualifying.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.issue_id.cmp(&b.issue_id))
        });

        let primary = qualifying.first().map(|r| r.issue_id);
        let relations = qualifying
            .into_iter()
            .map(|r| {
                PaperIssueRelation::new(paper.id, r.issue_id, r.score, Some(r.issue_id) == primary)
            })
            .collect();

        Classification { relations, primary }
    }

    /// Classify a paper and replace its stored relation rows.
    ///
    /// Replacement is a keyed upsert per (paper, issue): running this again
    /// after the paper's metadata changed leaves exactly one row per pair,
    /// and retried or out-of-order per-paper workers converge on the same
    /// state.
    pub fn classify_and_store<S: EvidenceStore>(
        &self,
        store: &mut S,
        paper: &Paper,
    ) -> Result<Classification, ClassifierError> {
        self.config
            .validate()
            .map_err(ClassifierError::Config)?;

        let issues = store
            .list_issues()
            .map_err(|e| ClassifierError::Store(e.to_string()))?;
        let keywords = store
            .list_keywords()
            .map_err(|e| ClassifierError::Store(e.to_string()))?;

        let classification = self.classify(paper, &issues, &keywords);

        store
            .replace_paper_relations(paper.id, &classification.relations)
            .map_err(|e| ClassifierError::Store(e.to_string()))?;

        if classification.is_classified() {
            tracing::debug!(
                paper = %paper.id,
                issues = classification.relations.len(),
                primary = ?classification.primary,
                "paper classified"
            );
        } else {
            tracing::debug!(paper = %paper.id, "paper stored unclassified");
        }

        Ok(classification)
    }
}
