use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    // ── Configuration ────────────────────────────────────────────────────────
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("sync configuration missing or disabled for loan type {0}")]
    SyncDisabled(String),

    // ── Stores ───────────────────────────────────────────────────────────────
    #[error("staging store error: {0}")]
    Staging(String),

    #[error("warehouse error: {0}")]
    Warehouse(String),

    #[error("metadata store error: {0}")]
    Meta(String),

    // ── Data ─────────────────────────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}
