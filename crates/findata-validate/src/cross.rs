use std::collections::HashSet;

use findata_core::{ErrorKind, FieldError, RawRow};

use crate::rules::field_value;

/// Referential check: a payment's `loan_account_number` must exist in the
/// caller-supplied loan set (batch credits ∪ already-loaded partition).
///
/// Empty loan numbers are skipped here; the REQUIRED field check has already
/// flagged them.
pub fn check_loan_reference(
    row: &RawRow,
    row_number: u64,
    known_loans: &HashSet<String>,
) -> Option<FieldError> {
    let loan = field_value(row, "loan_account_number");
    if loan.is_empty() || known_loans.contains(loan) {
        return None;
    }
    Some(FieldError {
        row_number,
        field_name: "loan_account_number".to_string(),
        kind: ErrorKind::CrossReference,
        message: format!("payment references non-existent credit: {loan}"),
        raw_value: Some(loan.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(loan: &str) -> RawRow {
        [("loan_account_number".to_string(), loan.to_string())]
            .into_iter()
            .collect()
    }

    fn loans(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_loan_passes() {
        assert!(check_loan_reference(&row("LOAN_001"), 1, &loans(&["LOAN_001"])).is_none());
    }

    #[test]
    fn loan_from_existing_partition_passes() {
        let known = loans(&["LOAN_BATCH", "LOAN_EXISTING"]);
        assert!(check_loan_reference(&row("LOAN_EXISTING"), 1, &known).is_none());
    }

    #[test]
    fn orphan_payment_fails_with_cross_reference() {
        let err = check_loan_reference(&row("LOAN_999"), 5, &loans(&["LOAN_001"])).unwrap();
        assert_eq!(err.kind, ErrorKind::CrossReference);
        assert_eq!(err.field_name, "loan_account_number");
        assert_eq!(err.raw_value.as_deref(), Some("LOAN_999"));
        assert_eq!(err.row_number, 5);
    }

    #[test]
    fn empty_set_rejects_everything() {
        assert!(check_loan_reference(&row("LOAN_001"), 1, &HashSet::new()).is_some());
    }

    #[test]
    fn empty_loan_number_is_not_reported_here() {
        assert!(check_loan_reference(&row("  "), 1, &HashSet::new()).is_none());
    }
}
