pub mod cache;
pub mod lock;
pub mod store;

pub use cache::Cache;
pub use lock::SyncLock;
pub use store::{ChunkCursor, UploadStore};
