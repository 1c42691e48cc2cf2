//! Paper-to-issue relations produced by the classifier

use crate::{IssueId, PaperId};

/// A many-to-many link between a paper and a dental issue.
///
/// Unique per (paper, issue); re-classification replaces a paper's rows
/// rather than appending to them.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperIssueRelation {
    /// The classified paper
    pub paper_id: PaperId,

    /// The issue it relates to
    pub issue_id: IssueId,

    /// Normalized relevance in [0, 1]
    pub relevance_score: f64,

    /// Whether this is the paper's single highest-relevance issue
    pub is_primary: bool,
}

impl PaperIssueRelation {
    /// Create a relation.
    ///
    /// # Panics
    /// Panics if `relevance_score` is outside [0, 1].
    pub fn new(paper_id: PaperId, issue_id: IssueId, relevance_score: f64, is_primary: bool) -> Self {
        assert!(
            (0.0..=1.0).contains(&relevance_score),
            "Relevance score must be in [0, 1]"
        );
        Self {
            paper_id,
            issue_id,
            relevance_score,
            is_primary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_creation() {
        let rel = PaperIssueRelation::new(PaperId(1), IssueId(2), 0.52, true);
        assert!(rel.is_primary);
        assert_eq!(rel.issue_id, IssueId(2));
    }

    #[test]
    #[should_panic]
    fn test_invalid_relevance_rejected() {
        PaperIssueRelation::new(PaperId(1), IssueId(2), 1.2, false);
    }
}
