use rust_decimal::Decimal;

use findata_core::{ErrorKind, FieldError, RawRow};

/// Trimmed field value, empty string when absent.
pub fn field_value<'a>(row: &'a RawRow, field: &str) -> &'a str {
    row.get(field).map(|v| v.trim()).unwrap_or("")
}

/// Error collector for one row.
///
/// Each check records at most one error and returns whether the field passed.
/// Optional fields pass vacuously when empty; only `require` complains about
/// absence.
pub struct RowErrors {
    row_number: u64,
    errors: Vec<FieldError>,
}

impl RowErrors {
    pub fn new(row_number: u64) -> Self {
        Self {
            row_number,
            errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    fn push(&mut self, field: &str, kind: ErrorKind, message: String, raw_value: Option<&str>) {
        self.errors.push(FieldError {
            row_number: self.row_number,
            field_name: field.to_string(),
            kind,
            message,
            raw_value: raw_value.map(str::to_string),
        });
    }

    // ── REQUIRED ─────────────────────────────────────────────────────────────

    pub fn require(&mut self, row: &RawRow, field: &str) -> bool {
        if field_value(row, field).is_empty() {
            self.push(
                field,
                ErrorKind::Required,
                format!("{field} is required"),
                row.get(field).map(String::as_str),
            );
            return false;
        }
        true
    }

    // ── TYPE / RANGE: integers ───────────────────────────────────────────────

    pub fn check_integer(
        &mut self,
        row: &RawRow,
        field: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> bool {
        let value = field_value(row, field);
        if value.is_empty() {
            return true;
        }
        let parsed: i64 = match value.parse() {
            Ok(v) => v,
            Err(_) => {
                self.push(
                    field,
                    ErrorKind::Type,
                    format!("{field} must be an integer, got: {value}"),
                    Some(value),
                );
                return false;
            }
        };
        if let Some(min) = min {
            if parsed < min {
                self.push(
                    field,
                    ErrorKind::Range,
                    format!("{field} must be >= {min}, got {parsed}"),
                    Some(value),
                );
                return false;
            }
        }
        if let Some(max) = max {
            if parsed > max {
                self.push(
                    field,
                    ErrorKind::Range,
                    format!("{field} must be <= {max}, got {parsed}"),
                    Some(value),
                );
                return false;
            }
        }
        true
    }

    // ── TYPE / RANGE: decimals ───────────────────────────────────────────────

    pub fn check_decimal(&mut self, row: &RawRow, field: &str, min: Option<Decimal>) -> bool {
        let value = field_value(row, field);
        if value.is_empty() {
            return true;
        }
        let parsed: Decimal = match value.parse() {
            Ok(v) => v,
            Err(_) => {
                self.push(
                    field,
                    ErrorKind::Type,
                    format!("{field} must be a number, got: {value}"),
                    Some(value),
                );
                return false;
            }
        };
        if let Some(min) = min {
            if parsed < min {
                self.push(
                    field,
                    ErrorKind::Range,
                    format!("{field} must be >= {min}, got {parsed}"),
                    Some(value),
                );
                return false;
            }
        }
        true
    }

    // ── FORMAT: dates ────────────────────────────────────────────────────────

    /// Accepts `YYYYMMDD` or `YYYY-MM-DD`; components must sit in
    /// year [1900, 2100], month [1, 12], day [1, 31].
    pub fn check_date(&mut self, row: &RawRow, field: &str) -> bool {
        let value = field_value(row, field);
        if value.is_empty() {
            return true;
        }
        let compact: String = value.chars().filter(|c| *c != '-').collect();
        if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
            self.push(
                field,
                ErrorKind::Format,
                format!("{field} must be YYYYMMDD or YYYY-MM-DD, got: {value}"),
                Some(value),
            );
            return false;
        }
        let year: u32 = compact[..4].parse().unwrap_or(0);
        let month: u32 = compact[4..6].parse().unwrap_or(0);
        let day: u32 = compact[6..8].parse().unwrap_or(0);
        if !(1900..=2100).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            self.push(
                field,
                ErrorKind::Format,
                format!("{field} has invalid date components: {value}"),
                Some(value),
            );
            return false;
        }
        true
    }

    // ── VALUE: enumerations ──────────────────────────────────────────────────

    pub fn check_one_of(&mut self, row: &RawRow, field: &str, allowed: &[&str]) -> bool {
        let value = field_value(row, field);
        if value.is_empty() {
            return true;
        }
        if !allowed.contains(&value) {
            self.push(
                field,
                ErrorKind::Value,
                format!("{field} must be one of {}, got: {value}", allowed.join(", ")),
                Some(value),
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn required_flags_empty_and_absent() {
        let r = row(&[("a", ""), ("b", "  ")]);
        let mut checks = RowErrors::new(1);
        assert!(!checks.require(&r, "a"));
        assert!(!checks.require(&r, "b"));
        assert!(!checks.require(&r, "missing"));
        let errors = checks.into_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Required));
    }

    #[test]
    fn optional_checks_pass_on_empty() {
        let r = row(&[("n", "")]);
        let mut checks = RowErrors::new(1);
        assert!(checks.check_integer(&r, "n", Some(0), None));
        assert!(checks.check_decimal(&r, "n", Some(Decimal::ZERO)));
        assert!(checks.check_date(&r, "n"));
        assert!(checks.check_one_of(&r, "n", &["A", "K"]));
        assert!(checks.is_clean());
    }

    #[test]
    fn integer_type_and_range() {
        let r = row(&[("n", "abc"), ("m", "-3"), ("k", "2")]);
        let mut checks = RowErrors::new(7);
        assert!(!checks.check_integer(&r, "n", None, None));
        assert!(!checks.check_integer(&r, "m", Some(0), None));
        assert!(!checks.check_integer(&r, "k", Some(0), Some(1)));
        let errors = checks.into_errors();
        assert_eq!(errors[0].kind, ErrorKind::Type);
        assert_eq!(errors[1].kind, ErrorKind::Range);
        assert_eq!(errors[2].kind, ErrorKind::Range);
        assert!(errors.iter().all(|e| e.row_number == 7));
    }

    #[test]
    fn decimal_type_and_floor() {
        let r = row(&[("amount", "12.5x"), ("neg", "-100")]);
        let mut checks = RowErrors::new(1);
        assert!(!checks.check_decimal(&r, "amount", None));
        assert!(!checks.check_decimal(&r, "neg", Some(Decimal::ZERO)));
        let errors = checks.into_errors();
        assert_eq!(errors[0].kind, ErrorKind::Type);
        assert_eq!(errors[1].kind, ErrorKind::Range);
    }

    #[test]
    fn date_formats() {
        let r = row(&[
            ("ok1", "20260302"),
            ("ok2", "2026-03-02"),
            ("slashes", "2025/03/02"),
            ("short", "202503"),
            ("year", "18991231"),
            ("month", "20251301"),
        ]);
        let mut checks = RowErrors::new(1);
        assert!(checks.check_date(&r, "ok1"));
        assert!(checks.check_date(&r, "ok2"));
        assert!(!checks.check_date(&r, "slashes"));
        assert!(!checks.check_date(&r, "short"));
        assert!(!checks.check_date(&r, "year"));
        assert!(!checks.check_date(&r, "month"));
        assert!(checks
            .into_errors()
            .iter()
            .all(|e| e.kind == ErrorKind::Format));
    }

    #[test]
    fn enum_membership() {
        let r = row(&[("s", "X")]);
        let mut checks = RowErrors::new(1);
        assert!(!checks.check_one_of(&r, "s", &["A", "K"]));
        let errors = checks.into_errors();
        assert_eq!(errors[0].kind, ErrorKind::Value);
        assert_eq!(errors[0].raw_value.as_deref(), Some("X"));
    }
}
