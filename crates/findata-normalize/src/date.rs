use chrono::NaiveDate;

/// Normalize a date field to a calendar date.
///
/// Accepts canonical `YYYY-MM-DD` directly; otherwise strips non-digits and
/// interprets an 8-digit remainder as `YYYYMMDD`. Anything else, including
/// impossible calendar components or a year outside `[1, 9999]`, is `None`.
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.len() == 10 && value.as_bytes()[4] == b'-' && value.as_bytes()[7] == b'-' {
        if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(d);
        }
        return None;
    }

    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return None;
    }
    let year: i32 = digits[..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_form() {
        assert_eq!(
            normalize_date("20260302"),
            Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
        );
    }

    #[test]
    fn dashed_form() {
        assert_eq!(
            normalize_date("2025-02-08"),
            Some(NaiveDate::from_ymd_opt(2025, 2, 8).unwrap())
        );
    }

    #[test]
    fn both_forms_agree() {
        assert_eq!(normalize_date("2025-04-02"), normalize_date("20250402"));
    }

    #[test]
    fn empty_and_garbage_are_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("   "), None);
        assert_eq!(normalize_date("abc"), None);
        assert_eq!(normalize_date("2025/03"), None);
    }

    #[test]
    fn impossible_components_are_none() {
        assert_eq!(normalize_date("20251301"), None); // month 13
        assert_eq!(normalize_date("20250230"), None); // Feb 30
        assert_eq!(normalize_date("00001231"), None); // year 0
    }
}
