//! Source-set tracking for derived rows
//!
//! Every derived row records the exact set of papers it was computed from,
//! enabling audit and re-derivation when source data changes. The set is
//! typed and ordered here; the delimited string form lives only at the
//! storage boundary.

use crate::PaperId;
use std::collections::BTreeSet;
use std::fmt;

/// Ordered set of contributing paper ids for a derived row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSet(BTreeSet<PaperId>);

impl SourceSet {
    /// Empty source set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterator of paper ids; duplicates collapse.
    pub fn from_ids<I: IntoIterator<Item = PaperId>>(ids: I) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Add a contributing paper.
    pub fn insert(&mut self, id: PaperId) {
        self.0.insert(id);
    }

    /// Number of contributing papers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no papers contributed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` contributed.
    pub fn contains(&self, id: PaperId) -> bool {
        self.0.contains(&id)
    }

    /// Iterate ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = PaperId> + '_ {
        self.0.iter().copied()
    }

    /// Format as the stored comma-delimited form, ids ascending.
    ///
    /// Only the storage layer should need this; it is deterministic so that
    /// re-running aggregation on unchanged inputs reproduces the column
    /// byte-for-byte.
    pub fn to_delimited(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|id| id.0.to_string()).collect();
        parts.join(",")
    }

    /// Parse the stored comma-delimited form.
    ///
    /// Returns an error naming the offending token; empty input parses to
    /// the empty set.
    pub fn parse_delimited(s: &str) -> Result<Self, String> {
        let mut set = BTreeSet::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let raw: i64 = token
                .parse()
                .map_err(|_| format!("Invalid paper id in source set: '{}'", token))?;
            set.insert(PaperId(raw));
        }
        Ok(Self(set))
    }
}

impl FromIterator<PaperId> for SourceSet {
    fn from_iter<I: IntoIterator<Item = PaperId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_delimited())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: round-trip through the delimited form preserves the set
        #[test]
        fn test_delimited_roundtrip_property(ids in proptest::collection::vec(0i64..100_000, 0..20)) {
            let set = SourceSet::from_ids(ids.into_iter().map(PaperId));
            let parsed = SourceSet::parse_delimited(&set.to_delimited()).unwrap();
            prop_assert_eq!(parsed, set);
        }

        /// Property: formatting is deterministic regardless of insertion order
        #[test]
        fn test_order_independent(mut ids in proptest::collection::vec(0i64..1000, 1..10)) {
            let forward = SourceSet::from_ids(ids.iter().copied().map(PaperId));
            ids.reverse();
            let backward = SourceSet::from_ids(ids.into_iter().map(PaperId));
            prop_assert_eq!(forward.to_delimited(), backward.to_delimited());
        }
    }
}
