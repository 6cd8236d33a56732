use rust_decimal::Decimal;

use findata_core::{FieldError, LoanType, RawRow};

use crate::rules::RowErrors;

const REQUIRED: &[&str] = &[
    "loan_account_number",
    "installment_number",
    "installment_amount",
    "principal_component",
];

const STATUSES: &[&str] = &["A", "K"];

/// Field-validate one payment plan row. Referential integrity against the
/// credit set is a separate pass ([`crate::cross`]).
pub fn validate_payment_row(row: &RawRow, row_number: u64, _loan_type: LoanType) -> Vec<FieldError> {
    let mut checks = RowErrors::new(row_number);

    for field in REQUIRED {
        checks.require(row, field);
    }

    checks.check_integer(row, "installment_number", Some(1), None);

    checks.check_decimal(row, "installment_amount", Some(Decimal::ZERO));
    checks.check_decimal(row, "principal_component", Some(Decimal::ZERO));
    checks.check_decimal(row, "interest_component", Some(Decimal::ZERO));
    checks.check_decimal(row, "kkdf_component", Some(Decimal::ZERO));
    checks.check_decimal(row, "bsmv_component", Some(Decimal::ZERO));
    checks.check_decimal(row, "remaining_principal", Some(Decimal::ZERO));
    checks.check_decimal(row, "remaining_interest", Some(Decimal::ZERO));
    checks.check_decimal(row, "remaining_kkdf", Some(Decimal::ZERO));
    checks.check_decimal(row, "remaining_bsmv", Some(Decimal::ZERO));

    checks.check_one_of(row, "installment_status", STATUSES);

    checks.check_date(row, "actual_payment_date");
    checks.check_date(row, "scheduled_payment_date");

    checks.into_errors()
}
