//! ─── Findata Adapter Tunables ────────────────────────────────────────────────
//!
//! Defaults for every knob the pipeline exposes. The environment-driven
//! `Settings` may override the first three; the rest are fixed bounds.

// ── Pipeline sizing ──────────────────────────────────────────────────────────

/// Rows per chunk streamed from the upload store. One decoded chunk is the
/// pipeline's working-set ceiling.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Abort threshold: a sync commits only while `invalid / total <= this`.
/// The comparison is strict `>`, so exactly 50% still commits.
pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.50;

/// Maximum seconds a sync may hold the distributed lock before the store
/// expires it. Must exceed the worst observed sync duration.
pub const DEFAULT_SYNC_LOCK_TTL_SECS: u64 = 600;

/// Poll interval while waiting on a contended lock.
pub const LOCK_POLL_INTERVAL_SECS: u64 = 2;

// ── Warehouse inserts ────────────────────────────────────────────────────────

/// Rows per bulk insert into a staging table.
pub const INSERT_BATCH_SIZE: usize = 50_000;

// ── Diagnostics bounds ───────────────────────────────────────────────────────

/// Raw failed rows retained per file type per sync. Overflow rows are still
/// counted in `error_count` but not retained.
pub const MAX_FAILED_ROWS_PER_FILE: usize = 10_000;

/// Error descriptors retained per file type per sync (persistence bound).
pub const MAX_ERRORS_PER_FILE: usize = 50_000;

/// Error descriptors per relational insert statement.
pub const ERROR_INSERT_BATCH_SIZE: usize = 1_000;

/// Lifetime of the failed-row preview lists in the ephemeral store.
pub const FAILED_ROWS_TTL_SECS: u64 = 86_400;
