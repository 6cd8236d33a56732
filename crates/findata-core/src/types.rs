use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AdapterError;

/// A row as received from the staging store: schemaless string map. The
/// validators and the insert marshaller define the effective schema.
pub type RawRow = HashMap<String, String>;

// ── LoanType ─────────────────────────────────────────────────────────────────

/// Warehouse partitioning key. Every sync replaces exactly one loan-type
/// partition per fact table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    Retail,
    Commercial,
}

impl LoanType {
    pub const ALL: [LoanType; 2] = [LoanType::Retail, LoanType::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Retail => "RETAIL",
            LoanType::Commercial => "COMMERCIAL",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RETAIL" => Ok(LoanType::Retail),
            "COMMERCIAL" => Ok(LoanType::Commercial),
            other => Err(AdapterError::Config(format!("unknown loan type: {other}"))),
        }
    }
}

// ── FileType ─────────────────────────────────────────────────────────────────

/// The two datasets streamed per sync: the credit master file and the
/// per-installment payment plan file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Credit,
    PaymentPlan,
}

impl FileType {
    pub const ALL: [FileType; 2] = [FileType::Credit, FileType::PaymentPlan];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Credit => "credit",
            FileType::PaymentPlan => "payment_plan",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(FileType::Credit),
            "payment_plan" => Ok(FileType::PaymentPlan),
            other => Err(AdapterError::Config(format!("unknown file type: {other}"))),
        }
    }
}

// ── TenantSnapshot ───────────────────────────────────────────────────────────

/// Read-only tenant descriptor handed to the engine at construction.
///
/// Owned by the registry; the engine never mutates it and passes it
/// explicitly through every persistence call (no ambient tenant state).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSnapshot {
    /// Stable external identifier, e.g. `BANK001`.
    pub tenant_id: String,
    /// Postgres schema holding this tenant's sync metadata tables.
    pub pg_schema: String,
    /// ClickHouse database holding this tenant's fact and staging tables.
    pub ch_database: String,
    /// Base URL of the external staging service that receives uploads.
    pub external_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_type_round_trips_through_str() {
        for lt in LoanType::ALL {
            assert_eq!(lt.as_str().parse::<LoanType>().unwrap(), lt);
        }
        assert_eq!("retail".parse::<LoanType>().unwrap(), LoanType::Retail);
        assert!("MORTGAGE".parse::<LoanType>().is_err());
    }

    #[test]
    fn file_type_round_trips_through_str() {
        for ft in FileType::ALL {
            assert_eq!(ft.as_str().parse::<FileType>().unwrap(), ft);
        }
        assert!("invoice".parse::<FileType>().is_err());
    }
}
