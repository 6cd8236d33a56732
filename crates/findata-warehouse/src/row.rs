//! Typed staging rows and the string-to-column coercions.
//!
//! Raw rows stay string maps until this point; normalization (dates, rates,
//! categories) and marshalling (uint clamping, nullable mapping) happen
//! together while building the insert row, so the warehouse only ever sees
//! typed values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use findata_core::{LoanType, RawRow};
use findata_normalize::{map_insurance, map_status, map_customer_type, normalize_date, normalize_rate};

fn field<'a>(row: &'a RawRow, name: &str) -> &'a str {
    row.get(name).map(|v| v.trim()).unwrap_or("")
}

// ── Column coercions ─────────────────────────────────────────────────────────

/// Base-10 parse clamped to `>= 0`; unparseable input becomes 0.
pub fn to_uint(value: &str) -> u32 {
    value
        .trim()
        .parse::<i64>()
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Empty, absent, or literal `"None"` maps to null; so does a failed parse.
pub fn to_nullable_uint(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() || value == "None" {
        return None;
    }
    value
        .parse::<i64>()
        .ok()
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
}

/// Decimal with a non-null default: parse failure and empty both yield 0.
pub fn to_decimal(value: &str) -> Decimal {
    value.trim().parse().unwrap_or(Decimal::ZERO)
}

/// Nullable decimal: empty / `"None"` / unparseable all map to null.
pub fn to_nullable_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() || value == "None" {
        return None;
    }
    value.parse().ok()
}

/// Empty string maps to null; anything else passes through.
pub fn to_nullable_string(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ── CreditRow ────────────────────────────────────────────────────────────────

/// One staging_credit row, serializable as a `JSONEachRow` line.
#[derive(Debug, Clone, Serialize)]
pub struct CreditRow {
    pub batch_id: Uuid,
    pub loan_type: String,
    /// Unix seconds; ClickHouse reads integers into DateTime.
    pub loaded_at: i64,

    pub loan_account_number: String,
    pub customer_id: String,
    pub customer_type: String,
    pub loan_status_code: String,
    pub days_past_due: u32,
    pub final_maturity_date: Option<NaiveDate>,
    pub total_installment_count: u32,
    pub outstanding_installment_count: u32,
    pub paid_installment_count: u32,
    pub first_payment_date: Option<NaiveDate>,
    pub original_loan_amount: Decimal,
    pub outstanding_principal_balance: Decimal,
    pub nominal_interest_rate: Decimal,
    pub total_interest_amount: Decimal,
    pub kkdf_rate: Decimal,
    pub kkdf_amount: Decimal,
    pub bsmv_rate: Decimal,
    pub bsmv_amount: Decimal,
    pub grace_period_months: u32,
    pub installment_frequency: u32,
    pub loan_start_date: Option<NaiveDate>,
    pub loan_closing_date: Option<NaiveDate>,
    pub internal_rating: Option<u32>,
    pub external_rating: Option<u32>,

    // Commercial-only
    pub loan_product_type: Option<u32>,
    pub customer_region_code: Option<String>,
    pub sector_code: Option<u32>,
    pub internal_credit_rating: Option<u32>,
    pub default_probability: Option<Decimal>,
    pub risk_class: Option<u32>,
    pub customer_segment: Option<u32>,

    // Retail-only
    pub insurance_included: Option<u8>,
    pub customer_district_code: Option<String>,
    pub customer_province_code: Option<String>,
}

impl CreditRow {
    /// Build a staging row from a field-validated raw row. Total: every
    /// coercion has a defensive default, so a validated row always marshals.
    pub fn from_raw(row: &RawRow, loan_type: LoanType, batch_id: Uuid, loaded_at: i64) -> Self {
        let installment_frequency = {
            let raw = field(row, "installment_frequency");
            if raw.is_empty() {
                1
            } else {
                to_uint(raw)
            }
        };

        Self {
            batch_id,
            loan_type: loan_type.as_str().to_string(),
            loaded_at,

            loan_account_number: field(row, "loan_account_number").to_string(),
            customer_id: field(row, "customer_id").to_string(),
            customer_type: map_customer_type(field(row, "customer_type")),
            loan_status_code: map_status(field(row, "loan_status_code")),
            days_past_due: to_uint(field(row, "days_past_due")),
            final_maturity_date: normalize_date(field(row, "final_maturity_date")),
            total_installment_count: to_uint(field(row, "total_installment_count")),
            outstanding_installment_count: to_uint(field(row, "outstanding_installment_count")),
            paid_installment_count: to_uint(field(row, "paid_installment_count")),
            first_payment_date: normalize_date(field(row, "first_payment_date")),
            original_loan_amount: to_decimal(field(row, "original_loan_amount")),
            outstanding_principal_balance: to_decimal(field(row, "outstanding_principal_balance")),
            nominal_interest_rate: normalize_rate(field(row, "nominal_interest_rate")),
            total_interest_amount: to_decimal(field(row, "total_interest_amount")),
            kkdf_rate: normalize_rate(field(row, "kkdf_rate")),
            kkdf_amount: to_decimal(field(row, "kkdf_amount")),
            bsmv_rate: normalize_rate(field(row, "bsmv_rate")),
            bsmv_amount: to_decimal(field(row, "bsmv_amount")),
            grace_period_months: to_uint(field(row, "grace_period_months")),
            installment_frequency,
            loan_start_date: normalize_date(field(row, "loan_start_date")),
            loan_closing_date: normalize_date(field(row, "loan_closing_date")),
            internal_rating: to_nullable_uint(field(row, "internal_rating")),
            external_rating: to_nullable_uint(field(row, "external_rating")),

            loan_product_type: to_nullable_uint(field(row, "loan_product_type")),
            customer_region_code: to_nullable_string(field(row, "customer_region_code")),
            sector_code: to_nullable_uint(field(row, "sector_code")),
            internal_credit_rating: to_nullable_uint(field(row, "internal_credit_rating")),
            default_probability: match loan_type {
                // Rate-normalized for commercial files, where the column is
                // populated; retail files rarely carry it, pass-through.
                LoanType::Commercial => Some(normalize_rate(field(row, "default_probability"))),
                LoanType::Retail => to_nullable_decimal(field(row, "default_probability")),
            },
            risk_class: to_nullable_uint(field(row, "risk_class")),
            customer_segment: to_nullable_uint(field(row, "customer_segment")),

            insurance_included: match loan_type {
                LoanType::Retail => map_insurance(field(row, "insurance_included")),
                LoanType::Commercial => {
                    to_nullable_uint(field(row, "insurance_included")).map(|v| v.min(1) as u8)
                }
            },
            customer_district_code: to_nullable_string(field(row, "customer_district_code")),
            customer_province_code: to_nullable_string(field(row, "customer_province_code")),
        }
    }
}

// ── PaymentRow ───────────────────────────────────────────────────────────────

/// One staging_payment row, serializable as a `JSONEachRow` line.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub batch_id: Uuid,
    pub loan_type: String,
    pub loaded_at: i64,

    pub loan_account_number: String,
    pub installment_number: u32,
    pub actual_payment_date: Option<NaiveDate>,
    pub scheduled_payment_date: Option<NaiveDate>,
    pub installment_amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    pub kkdf_component: Decimal,
    pub bsmv_component: Decimal,
    pub installment_status: String,
    pub remaining_principal: Decimal,
    pub remaining_interest: Decimal,
    pub remaining_kkdf: Decimal,
    pub remaining_bsmv: Decimal,
}

impl PaymentRow {
    pub fn from_raw(row: &RawRow, loan_type: LoanType, batch_id: Uuid, loaded_at: i64) -> Self {
        Self {
            batch_id,
            loan_type: loan_type.as_str().to_string(),
            loaded_at,

            loan_account_number: field(row, "loan_account_number").to_string(),
            installment_number: to_uint(field(row, "installment_number")),
            actual_payment_date: normalize_date(field(row, "actual_payment_date")),
            scheduled_payment_date: normalize_date(field(row, "scheduled_payment_date")),
            installment_amount: to_decimal(field(row, "installment_amount")),
            principal_component: to_decimal(field(row, "principal_component")),
            interest_component: to_decimal(field(row, "interest_component")),
            kkdf_component: to_decimal(field(row, "kkdf_component")),
            bsmv_component: to_decimal(field(row, "bsmv_component")),
            installment_status: map_status(field(row, "installment_status")),
            remaining_principal: to_decimal(field(row, "remaining_principal")),
            remaining_interest: to_decimal(field(row, "remaining_interest")),
            remaining_kkdf: to_decimal(field(row, "remaining_kkdf")),
            remaining_bsmv: to_decimal(field(row, "remaining_bsmv")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn uint_clamps_negatives_and_garbage_to_zero() {
        assert_eq!(to_uint("42"), 42);
        assert_eq!(to_uint("-3"), 0);
        assert_eq!(to_uint(""), 0);
        assert_eq!(to_uint("abc"), 0);
    }

    #[test]
    fn nullable_uint_maps_sentinels_to_null() {
        assert_eq!(to_nullable_uint("7"), Some(7));
        assert_eq!(to_nullable_uint(""), None);
        assert_eq!(to_nullable_uint("None"), None);
        assert_eq!(to_nullable_uint("x"), None);
    }

    #[test]
    fn decimal_defaults() {
        assert_eq!(to_decimal("12.50"), dec("12.50"));
        assert_eq!(to_decimal("bogus"), Decimal::ZERO);
        assert_eq!(to_nullable_decimal(""), None);
        assert_eq!(to_nullable_decimal("None"), None);
        assert_eq!(to_nullable_decimal("0.02"), Some(dec("0.02")));
    }

    #[test]
    fn credit_row_normalizes_while_marshalling() {
        let row = raw(&[
            ("loan_account_number", "LOAN_001"),
            ("customer_id", "CUST_001"),
            ("customer_type", "I"),
            ("loan_status_code", "A"),
            ("original_loan_amount", "10000"),
            ("outstanding_principal_balance", "8000"),
            ("nominal_interest_rate", "5.14"),
            ("final_maturity_date", "20260302"),
            ("first_payment_date", "2025-04-02"),
            ("insurance_included", "E"),
            ("days_past_due", "-1"),
        ]);
        let credit = CreditRow::from_raw(&row, LoanType::Retail, Uuid::new_v4(), 0);

        assert_eq!(credit.customer_type, "INDIVIDUAL");
        assert_eq!(credit.loan_status_code, "ACTIVE");
        assert_eq!(credit.nominal_interest_rate, dec("0.0514"));
        assert_eq!(
            credit.final_maturity_date,
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
        assert_eq!(
            credit.first_payment_date,
            NaiveDate::from_ymd_opt(2025, 4, 2)
        );
        assert_eq!(credit.insurance_included, Some(1));
        assert_eq!(credit.days_past_due, 0);
        assert_eq!(credit.installment_frequency, 1);
        assert_eq!(credit.loan_closing_date, None);
        assert_eq!(credit.sector_code, None);
    }

    #[test]
    fn commercial_default_probability_is_rate_normalized() {
        let row = raw(&[
            ("loan_account_number", "LOAN_C1"),
            ("customer_type", "T"),
            ("default_probability", "2.17"),
        ]);
        let credit = CreditRow::from_raw(&row, LoanType::Commercial, Uuid::new_v4(), 0);
        assert_eq!(credit.default_probability, Some(dec("0.0217")));
        assert_eq!(credit.customer_type, "TRADE");
    }

    #[test]
    fn commercial_empty_default_probability_is_zero_not_null() {
        let row = raw(&[("loan_account_number", "LOAN_C2")]);
        let credit = CreditRow::from_raw(&row, LoanType::Commercial, Uuid::new_v4(), 0);
        assert_eq!(credit.default_probability, Some(Decimal::ZERO));
    }

    #[test]
    fn payment_row_maps_status_and_dates() {
        let row = raw(&[
            ("loan_account_number", "LOAN_001"),
            ("installment_number", "1"),
            ("installment_amount", "17790"),
            ("principal_component", "13640"),
            ("installment_status", "K"),
            ("scheduled_payment_date", "2025-02-08"),
        ]);
        let payment = PaymentRow::from_raw(&row, LoanType::Retail, Uuid::new_v4(), 0);
        assert_eq!(payment.installment_status, "CLOSED");
        assert_eq!(payment.installment_number, 1);
        assert_eq!(
            payment.scheduled_payment_date,
            NaiveDate::from_ymd_opt(2025, 2, 8)
        );
        assert_eq!(payment.actual_payment_date, None);
        assert_eq!(payment.installment_amount, dec("17790"));
    }

    #[test]
    fn rows_serialize_as_json_lines() {
        let row = raw(&[
            ("loan_account_number", "LOAN_001"),
            ("customer_type", "I"),
        ]);
        let credit = CreditRow::from_raw(&row, LoanType::Retail, Uuid::nil(), 1_700_000_000);
        let line = serde_json::to_string(&credit).unwrap();
        assert!(line.contains("\"loan_account_number\":\"LOAN_001\""));
        assert!(line.contains("\"customer_type\":\"INDIVIDUAL\""));
        assert!(line.contains("\"final_maturity_date\":null"));
        assert!(line.contains("\"loaded_at\":1700000000"));
    }
}
