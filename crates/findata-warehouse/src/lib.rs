pub mod client;
pub mod ddl;
pub mod manager;
pub mod row;

pub use client::ClickHouseClient;
pub use manager::StorageManager;
pub use row::{CreditRow, PaymentRow};
