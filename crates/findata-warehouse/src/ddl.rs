//! Fact and staging table definitions.
//!
//! Both fact tables are `ReplacingMergeTree` partitioned by `loan_type`, so
//! one `REPLACE PARTITION` from a fully populated staging table swaps a whole
//! loan type atomically. Staging tables are byte-identical schemas.

use findata_core::{AdapterError, ClickHouseSettings, FileType};

use crate::client::ClickHouseClient;

pub const FACT_CREDIT_DDL: &str = "\
CREATE TABLE IF NOT EXISTS fact_credit (
    batch_id                        UUID,
    loan_type                       LowCardinality(String),
    loaded_at                       DateTime DEFAULT now(),

    loan_account_number             String,
    customer_id                     String,
    customer_type                   LowCardinality(String),
    loan_status_code                LowCardinality(String),
    days_past_due                   UInt32 DEFAULT 0,
    final_maturity_date             Nullable(Date),
    total_installment_count         UInt32 DEFAULT 0,
    outstanding_installment_count   UInt32 DEFAULT 0,
    paid_installment_count          UInt32 DEFAULT 0,
    first_payment_date              Nullable(Date),
    original_loan_amount            Decimal(18, 2),
    outstanding_principal_balance   Decimal(18, 2),
    nominal_interest_rate           Decimal(10, 6),
    total_interest_amount           Decimal(18, 2) DEFAULT 0,
    kkdf_rate                       Decimal(10, 6) DEFAULT 0,
    kkdf_amount                     Decimal(18, 2) DEFAULT 0,
    bsmv_rate                       Decimal(10, 6) DEFAULT 0,
    bsmv_amount                     Decimal(18, 2) DEFAULT 0,
    grace_period_months             UInt32 DEFAULT 0,
    installment_frequency           UInt32 DEFAULT 1,
    loan_start_date                 Nullable(Date),
    loan_closing_date               Nullable(Date),
    internal_rating                 Nullable(UInt32),
    external_rating                 Nullable(UInt32),

    loan_product_type               Nullable(UInt32),
    customer_region_code            Nullable(String),
    sector_code                     Nullable(UInt32),
    internal_credit_rating          Nullable(UInt32),
    default_probability             Nullable(Decimal(10, 6)),
    risk_class                      Nullable(UInt32),
    customer_segment                Nullable(UInt32),

    insurance_included              Nullable(UInt8),
    customer_district_code          Nullable(String),
    customer_province_code          Nullable(String)
)
ENGINE = ReplacingMergeTree(loaded_at)
PARTITION BY loan_type
ORDER BY (loan_type, loan_account_number)
SETTINGS index_granularity = 8192";

pub const FACT_PAYMENT_DDL: &str = "\
CREATE TABLE IF NOT EXISTS fact_payment (
    batch_id                UUID,
    loan_type               LowCardinality(String),
    loaded_at               DateTime DEFAULT now(),

    loan_account_number     String,
    installment_number      UInt32,
    actual_payment_date     Nullable(Date),
    scheduled_payment_date  Nullable(Date),
    installment_amount      Decimal(18, 2),
    principal_component     Decimal(18, 2),
    interest_component      Decimal(18, 2) DEFAULT 0,
    kkdf_component          Decimal(18, 2) DEFAULT 0,
    bsmv_component          Decimal(18, 2) DEFAULT 0,
    installment_status      LowCardinality(String),
    remaining_principal     Decimal(18, 2) DEFAULT 0,
    remaining_interest      Decimal(18, 2) DEFAULT 0,
    remaining_kkdf          Decimal(18, 2) DEFAULT 0,
    remaining_bsmv          Decimal(18, 2) DEFAULT 0
)
ENGINE = ReplacingMergeTree(loaded_at)
PARTITION BY loan_type
ORDER BY (loan_type, loan_account_number, installment_number)
SETTINGS index_granularity = 8192";

/// Fact table for a file type.
pub fn fact_table(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Credit => "fact_credit",
        FileType::PaymentPlan => "fact_payment",
    }
}

/// Staging table for a file type.
pub fn staging_table(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Credit => "staging_credit",
        FileType::PaymentPlan => "staging_payment",
    }
}

fn staging_ddl(file_type: FileType) -> String {
    match file_type {
        FileType::Credit => FACT_CREDIT_DDL.replace("fact_credit", "staging_credit"),
        FileType::PaymentPlan => FACT_PAYMENT_DDL.replace("fact_payment", "staging_payment"),
    }
}

/// Create one tenant's warehouse database with its two fact and two staging
/// tables. Idempotent.
pub async fn init_database(
    settings: &ClickHouseSettings,
    database: &str,
) -> Result<(), AdapterError> {
    let admin = ClickHouseClient::new(settings, "default");
    admin
        .command(&format!("CREATE DATABASE IF NOT EXISTS {database}"))
        .await?;

    let db = ClickHouseClient::new(settings, database);
    db.command(FACT_CREDIT_DDL).await?;
    db.command(FACT_PAYMENT_DDL).await?;
    for file_type in FileType::ALL {
        db.command(&staging_ddl(file_type)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_schema_mirrors_fact_schema() {
        for file_type in FileType::ALL {
            let ddl = staging_ddl(file_type);
            assert!(ddl.contains(staging_table(file_type)));
            assert!(!ddl.contains(fact_table(file_type)));
            assert!(ddl.contains("ReplacingMergeTree(loaded_at)"));
            assert!(ddl.contains("PARTITION BY loan_type"));
        }
    }

    #[test]
    fn payment_order_key_includes_installment_number() {
        assert!(FACT_PAYMENT_DDL.contains("(loan_type, loan_account_number, installment_number)"));
    }
}
