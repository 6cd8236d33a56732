pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod types;

pub use config::{ClickHouseSettings, PgSettings, RedisSettings, Settings};
pub use constants::*;
pub use error::AdapterError;
pub use model::{ErrorKind, FieldError, SyncLog, SyncStatus};
pub use types::{FileType, LoanType, RawRow, TenantSnapshot};
