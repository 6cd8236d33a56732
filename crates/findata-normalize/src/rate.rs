use rust_decimal::Decimal;

use findata_core::LoanType;

/// Rate fields present in every credit record.
const CREDIT_RATE_FIELDS: &[&str] = &["nominal_interest_rate", "kkdf_rate", "bsmv_rate"];

/// Commercial credits additionally carry a default probability.
const COMMERCIAL_RATE_FIELDS: &[&str] = &[
    "nominal_interest_rate",
    "kkdf_rate",
    "bsmv_rate",
    "default_probability",
];

/// Rate fields to normalize for a credit record of the given loan type.
pub fn rate_fields(loan_type: LoanType) -> &'static [&'static str] {
    match loan_type {
        LoanType::Retail => CREDIT_RATE_FIELDS,
        LoanType::Commercial => COMMERCIAL_RATE_FIELDS,
    }
}

/// Normalize a rate to fractional form.
///
/// Upstream files are inconsistent about units: some send `55.47` meaning
/// 55.47%, others send `0.5547`. Anything above 1 is treated as a percentage
/// and divided by 100; empty or unparseable input becomes 0.
pub fn normalize_rate(value: &str) -> Decimal {
    let value = value.trim();
    if value.is_empty() {
        return Decimal::ZERO;
    }
    match value.parse::<Decimal>() {
        Ok(rate) if rate > Decimal::ONE => rate / Decimal::from(100),
        Ok(rate) => rate,
        Err(_) => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn percentage_is_divided() {
        assert_eq!(normalize_rate("55.47"), dec("0.5547"));
        assert_eq!(normalize_rate("5.14"), dec("0.0514"));
        assert_eq!(normalize_rate("15.14"), dec("0.1514"));
    }

    #[test]
    fn fraction_passes_through() {
        assert_eq!(normalize_rate("0.0217"), dec("0.0217"));
        assert_eq!(normalize_rate("0.05"), dec("0.05"));
        assert_eq!(normalize_rate("1"), dec("1"));
    }

    #[test]
    fn empty_or_garbage_is_zero() {
        assert_eq!(normalize_rate(""), Decimal::ZERO);
        assert_eq!(normalize_rate("  "), Decimal::ZERO);
        assert_eq!(normalize_rate("n/a"), Decimal::ZERO);
    }

    #[test]
    fn idempotent_on_its_own_output() {
        for raw in ["55.47", "5.14", "0.0217", "0", "", "100"] {
            let once = normalize_rate(raw);
            assert_eq!(normalize_rate(&once.to_string()), once, "input {raw:?}");
        }
    }

    #[test]
    fn parseable_percentages_land_in_unit_interval() {
        for raw in ["0", "0.5", "1", "5.14", "55.47", "99.99", "100"] {
            let r = normalize_rate(raw);
            assert!(r >= Decimal::ZERO && r <= Decimal::ONE, "{raw} -> {r}");
        }
    }

    #[test]
    fn commercial_field_list_includes_default_probability() {
        assert!(rate_fields(LoanType::Commercial).contains(&"default_probability"));
        assert!(!rate_fields(LoanType::Retail).contains(&"default_probability"));
    }
}
