use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::LoanType;

// ── SyncStatus ───────────────────────────────────────────────────────────────

/// Lifecycle of one sync invocation.
///
/// ```text
/// STARTED ─► FETCHING ─► VALIDATING ─► NORMALIZING ─► STORING ─► COMPLETED
///       │          │              │              │         │
///       └──────────┴──────────────┴──────────────┴─────────┴──► FAILED
/// ```
///
/// VALIDATING / NORMALIZING / STORING are re-entered once per streamed chunk;
/// each transition is an idempotent single-column update so observers can
/// watch progress.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    Started,
    Fetching,
    Validating,
    Normalizing,
    Storing,
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Started => "STARTED",
            SyncStatus::Fetching => "FETCHING",
            SyncStatus::Validating => "VALIDATING",
            SyncStatus::Normalizing => "NORMALIZING",
            SyncStatus::Storing => "STORING",
            SyncStatus::Completed => "COMPLETED",
            SyncStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Completed | SyncStatus::Failed)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ErrorKind ────────────────────────────────────────────────────────────────

/// Validation error taxonomy. The string forms are the persisted values and
/// the `error_type` metric label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Required field empty or absent.
    Required,
    /// Not parseable as integer / decimal.
    Type,
    /// Numeric value outside its allowed range.
    Range,
    /// Date neither `YYYYMMDD` nor `YYYY-MM-DD`, or invalid components.
    Format,
    /// Enumerated value outside the allowed set.
    Value,
    /// Payment references a loan account absent from batch and warehouse.
    CrossReference,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "REQUIRED",
            ErrorKind::Type => "TYPE",
            ErrorKind::Range => "RANGE",
            ErrorKind::Format => "FORMAT",
            ErrorKind::Value => "VALUE",
            ErrorKind::CrossReference => "CROSS_REFERENCE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FieldError ───────────────────────────────────────────────────────────────

/// One field-level validation failure. `row_number` is the per-file-type
/// global index, monotonically increasing across streamed chunks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub row_number: u64,
    pub field_name: String,
    pub kind: ErrorKind,
    pub message: String,
    pub raw_value: Option<String>,
}

impl FieldError {
    /// Key under which this error is aggregated in `SyncLog::error_summary`.
    pub fn summary_key(&self) -> String {
        format!("{}:{}", self.field_name, self.kind)
    }
}

// ── SyncLog ──────────────────────────────────────────────────────────────────

/// Per-invocation record, created at entry and terminal on COMPLETED or
/// FAILED. Mutated only by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncLog {
    pub id: Uuid,
    pub loan_type: LoanType,
    pub batch_id: Uuid,
    pub status: SyncStatus,
    pub total_credit_rows: i64,
    pub total_payment_rows: i64,
    pub valid_credit_rows: i64,
    pub valid_payment_rows: i64,
    pub error_count: i64,
    /// `"<field>:<KIND>" → count`, plus optional `reason` / `exception` keys.
    pub error_summary: BTreeMap<String, serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncLog {
    pub fn new(loan_type: LoanType) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_type,
            batch_id: Uuid::new_v4(),
            status: SyncStatus::Started,
            total_credit_rows: 0,
            total_payment_rows: 0,
            valid_credit_rows: 0,
            valid_payment_rows: 0,
            error_count: 0,
            error_summary: BTreeMap::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(SyncStatus::Completed.is_terminal());
        assert!(SyncStatus::Failed.is_terminal());
        assert!(!SyncStatus::Storing.is_terminal());
        assert!(!SyncStatus::Started.is_terminal());
    }

    #[test]
    fn summary_key_joins_field_and_kind() {
        let err = FieldError {
            row_number: 3,
            field_name: "customer_type".into(),
            kind: ErrorKind::Value,
            message: "customer_type must be one of I, T, V".into(),
            raw_value: Some("X".into()),
        };
        assert_eq!(err.summary_key(), "customer_type:VALUE");
    }

    #[test]
    fn fresh_log_starts_started_with_distinct_ids() {
        let log = SyncLog::new(LoanType::Retail);
        assert_eq!(log.status, SyncStatus::Started);
        assert_ne!(log.id, log.batch_id);
        assert!(log.completed_at.is_none());
    }
}
