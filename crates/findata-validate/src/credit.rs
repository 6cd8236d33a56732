use rust_decimal::Decimal;

use findata_core::{FieldError, LoanType, RawRow};

use crate::rules::RowErrors;

/// Fields every credit record must carry regardless of loan type.
const REQUIRED: &[&str] = &[
    "loan_account_number",
    "customer_id",
    "customer_type",
    "loan_status_code",
    "original_loan_amount",
    "outstanding_principal_balance",
];

const CUSTOMER_TYPES: &[&str] = &["I", "T", "V"];
const STATUS_CODES: &[&str] = &["A", "K"];

/// Field-validate one credit row. Returns every error found; an empty vec
/// means the row is valid.
pub fn validate_credit_row(row: &RawRow, row_number: u64, loan_type: LoanType) -> Vec<FieldError> {
    let mut checks = RowErrors::new(row_number);

    for field in REQUIRED {
        checks.require(row, field);
    }

    checks.check_one_of(row, "customer_type", CUSTOMER_TYPES);
    checks.check_one_of(row, "loan_status_code", STATUS_CODES);

    // Amounts and rates
    checks.check_decimal(row, "original_loan_amount", Some(Decimal::ZERO));
    checks.check_decimal(row, "outstanding_principal_balance", Some(Decimal::ZERO));
    checks.check_decimal(row, "nominal_interest_rate", Some(Decimal::ZERO));
    checks.check_decimal(row, "total_interest_amount", Some(Decimal::ZERO));
    checks.check_decimal(row, "kkdf_rate", Some(Decimal::ZERO));
    checks.check_decimal(row, "kkdf_amount", Some(Decimal::ZERO));
    checks.check_decimal(row, "bsmv_rate", Some(Decimal::ZERO));
    checks.check_decimal(row, "bsmv_amount", Some(Decimal::ZERO));

    // Counters
    checks.check_integer(row, "days_past_due", Some(0), None);
    checks.check_integer(row, "total_installment_count", Some(0), None);
    checks.check_integer(row, "outstanding_installment_count", Some(0), None);
    checks.check_integer(row, "paid_installment_count", Some(0), None);
    checks.check_integer(row, "grace_period_months", Some(0), None);
    checks.check_integer(row, "installment_frequency", Some(0), None);
    checks.check_integer(row, "internal_rating", None, None);
    checks.check_integer(row, "external_rating", None, None);

    // Dates
    checks.check_date(row, "final_maturity_date");
    checks.check_date(row, "first_payment_date");
    checks.check_date(row, "loan_start_date");
    checks.check_date(row, "loan_closing_date");

    match loan_type {
        LoanType::Retail => {
            checks.check_one_of(row, "insurance_included", &["H", "E"]);
        }
        LoanType::Commercial => {
            checks.check_integer(row, "loan_product_type", None, None);
            checks.check_integer(row, "sector_code", None, None);
            checks.check_integer(row, "internal_credit_rating", None, None);
            checks.check_decimal(row, "default_probability", Some(Decimal::ZERO));
            checks.check_integer(row, "risk_class", None, None);
            checks.check_integer(row, "customer_segment", None, None);
            checks.check_one_of(row, "loan_status_flag", STATUS_CODES);
        }
    }

    checks.into_errors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use findata_core::ErrorKind;

    fn base_row() -> RawRow {
        [
            ("loan_account_number", "LOAN_001"),
            ("customer_id", "CUST_001"),
            ("customer_type", "I"),
            ("loan_status_code", "A"),
            ("original_loan_amount", "10000"),
            ("outstanding_principal_balance", "8000"),
            ("days_past_due", "0"),
            ("total_installment_count", "12"),
            ("outstanding_installment_count", "8"),
            ("paid_installment_count", "4"),
            ("nominal_interest_rate", "5.14"),
            ("total_interest_amount", "500"),
            ("kkdf_rate", "0"),
            ("kkdf_amount", "0"),
            ("bsmv_rate", "0"),
            ("bsmv_amount", "0"),
            ("grace_period_months", "0"),
            ("installment_frequency", "1"),
            ("final_maturity_date", "20260302"),
            ("first_payment_date", "20250402"),
            ("loan_start_date", "20250302"),
            ("loan_closing_date", ""),
            ("insurance_included", "H"),
            ("customer_district_code", "DISTRICT_A"),
            ("customer_province_code", "PROVINCE_1"),
            ("internal_rating", "2"),
            ("external_rating", "1366"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn with(field: &str, value: &str) -> RawRow {
        let mut row = base_row();
        row.insert(field.to_string(), value.to_string());
        row
    }

    #[test]
    fn valid_retail_row() {
        let errors = validate_credit_row(&base_row(), 1, LoanType::Retail);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn missing_required_field() {
        let errors = validate_credit_row(&with("loan_account_number", ""), 1, LoanType::Retail);
        assert!(errors
            .iter()
            .any(|e| e.field_name == "loan_account_number" && e.kind == ErrorKind::Required));
    }

    #[test]
    fn invalid_customer_type() {
        let errors = validate_credit_row(&with("customer_type", "X"), 1, LoanType::Retail);
        assert!(errors.iter().any(|e| e.kind == ErrorKind::Value));
    }

    #[test]
    fn invalid_status_code() {
        let errors = validate_credit_row(&with("loan_status_code", "Z"), 1, LoanType::Retail);
        assert!(!errors.is_empty());
    }

    #[test]
    fn negative_amount() {
        let errors = validate_credit_row(&with("original_loan_amount", "-100"), 1, LoanType::Retail);
        assert!(errors
            .iter()
            .any(|e| e.field_name == "original_loan_amount" && e.kind == ErrorKind::Range));
    }

    #[test]
    fn invalid_date_format() {
        let errors =
            validate_credit_row(&with("final_maturity_date", "2025/03/02"), 1, LoanType::Retail);
        assert!(errors.iter().any(|e| e.kind == ErrorKind::Format));
    }

    #[test]
    fn invalid_insurance_flag_on_retail() {
        let errors = validate_credit_row(&with("insurance_included", "X"), 1, LoanType::Retail);
        assert!(errors
            .iter()
            .any(|e| e.field_name == "insurance_included" && e.kind == ErrorKind::Value));
    }

    #[test]
    fn insurance_flag_ignored_on_commercial() {
        let mut row = with("insurance_included", "X");
        row.insert("customer_type".into(), "T".into());
        let errors = validate_credit_row(&row, 1, LoanType::Commercial);
        assert!(!errors.iter().any(|e| e.field_name == "insurance_included"));
    }

    #[test]
    fn commercial_specific_fields() {
        let mut row = base_row();
        for (k, v) in [
            ("customer_type", "T"),
            ("loan_product_type", "4"),
            ("sector_code", "3"),
            ("internal_credit_rating", "5"),
            ("default_probability", "0.02"),
            ("risk_class", "1"),
            ("customer_segment", "2"),
            ("loan_status_flag", "A"),
        ] {
            row.insert(k.to_string(), v.to_string());
        }
        let errors = validate_credit_row(&row, 1, LoanType::Commercial);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn commercial_rejects_bad_sector_code() {
        let mut row = with("sector_code", "steel");
        row.insert("customer_type".into(), "T".into());
        let errors = validate_credit_row(&row, 1, LoanType::Commercial);
        assert!(errors
            .iter()
            .any(|e| e.field_name == "sector_code" && e.kind == ErrorKind::Type));
    }

    #[test]
    fn one_bad_row_collects_multiple_errors() {
        let mut row = with("customer_type", "X");
        row.insert("original_loan_amount".into(), "abc".into());
        row.insert("customer_id".into(), "".into());
        let errors = validate_credit_row(&row, 42, LoanType::Retail);
        assert!(errors.len() >= 3);
        assert!(errors.iter().all(|e| e.row_number == 42));
    }
}
