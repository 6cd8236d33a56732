pub mod credit;
pub mod cross;
pub mod payment;
pub mod rules;

pub use credit::validate_credit_row;
pub use cross::check_loan_reference;
pub use payment::validate_payment_row;
pub use rules::RowErrors;
