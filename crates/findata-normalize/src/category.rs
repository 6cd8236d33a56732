//! Coded-value mappings.
//!
//! Unmapped input passes through unchanged so a later `VALUE` check still
//! sees the original token; already-expanded labels pass through too, which
//! makes every mapping idempotent.

/// `I` → `INDIVIDUAL`, `T` → `TRADE`, `V` → `VIP`.
pub fn map_customer_type(raw: &str) -> String {
    let raw = raw.trim();
    match raw {
        "I" => "INDIVIDUAL".to_string(),
        "T" => "TRADE".to_string(),
        "V" => "VIP".to_string(),
        other => other.to_string(),
    }
}

/// `A` → `ACTIVE`, `K` → `CLOSED`. Shared by loan status, commercial status
/// flag, and installment status.
pub fn map_status(raw: &str) -> String {
    let raw = raw.trim();
    match raw {
        "A" => "ACTIVE".to_string(),
        "K" => "CLOSED".to_string(),
        other => other.to_string(),
    }
}

/// Retail insurance flag: `H` → 0, `E` → 1, anything else unknown.
pub fn map_insurance(raw: &str) -> Option<u8> {
    match raw.trim() {
        "H" => Some(0),
        "E" => Some(1),
        _ => None,
    }
}
