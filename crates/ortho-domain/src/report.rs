//! User report audit records
//!
//! Every scoring invocation may be logged as a `UserReport`: the patient
//! inputs plus the computed result, append-only. Reports are never mutated
//! or deleted by the engine.

use crate::IssueId;
use std::fmt;

/// Unique identifier for a user report, based on UUIDv7.
///
/// UUIDv7 provides chronological sortability for the audit log and needs no
/// coordination between writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportId(u128);

impl ReportId {
    /// Generate a new UUIDv7-based ReportId.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ReportId from a raw u128 value.
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ReportId from a UUID string.
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value.
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A point-in-time scoring result: patient inputs, computed score, and the
/// serialized result bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct UserReport {
    /// Unique identifier
    pub id: ReportId,

    /// When the report was created (seconds since Unix epoch)
    pub created_at: u64,

    /// Patient age at scoring time
    pub patient_age: u8,

    /// Selected issue ids, as submitted
    pub issue_ids: Vec<IssueId>,

    /// The computed necessity score
    pub necessity_score: u8,

    /// Urgency label attached to the score
    pub urgency: String,

    /// Full result bundle, serialized as JSON by the caller
    pub result_json: String,

    /// Optional free-text notes supplied with the request
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_display_and_parse() {
        let id = ReportId::new();
        let id_str = id.to_string();
        assert_eq!(id_str.len(), 36);

        let parsed = ReportId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_report_id_chronological() {
        let id1 = ReportId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ReportId::new();
        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
    }

    #[test]
    fn test_report_id_invalid_string() {
        assert!(ReportId::from_string("not-a-valid-uuid").is_err());
        assert!(ReportId::from_string("").is_err());
    }
}
