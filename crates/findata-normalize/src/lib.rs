//! Pure value transforms applied to validated rows before staging.
//!
//! Every function is total: unparseable input yields a defensive default
//! (`None` or zero) rather than an error — validation has already recorded
//! anything worth reporting.

pub mod category;
pub mod date;
pub mod rate;

pub use category::{map_insurance, map_status, map_customer_type};
pub use date::normalize_date;
pub use rate::{normalize_rate, rate_fields};
