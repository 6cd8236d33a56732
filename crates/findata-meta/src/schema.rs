//! Registry and per-tenant schema DDL.
//!
//! Table names are interpolated (Postgres cannot bind identifiers), so every
//! schema name passes [`checked_ident`] first.

use findata_core::AdapterError;

use crate::{meta_err, MetaStore};

/// Validate a Postgres identifier before interpolation: ASCII letters,
/// digits and underscores, leading letter, at most 63 bytes.
pub fn checked_ident(name: &str) -> Result<&str, AdapterError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(AdapterError::InvalidIdentifier(name.to_string()))
    }
}

const TENANTS_DDL: &str = "\
CREATE TABLE IF NOT EXISTS public.tenants (
    tenant_id    TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    pg_schema    TEXT NOT NULL,
    ch_database  TEXT NOT NULL,
    is_active    BOOLEAN NOT NULL DEFAULT TRUE,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
)";

impl MetaStore {
    /// Create the shared tenant registry. Idempotent.
    pub async fn init_registry(&self) -> Result<(), AdapterError> {
        sqlx::query(TENANTS_DDL)
            .execute(self.pool())
            .await
            .map_err(meta_err)?;
        Ok(())
    }

    /// Create one tenant's schema and metadata tables. Idempotent.
    pub async fn init_tenant_schema(&self, pg_schema: &str) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;

        let statements = [
            format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
            format!(
                "CREATE TABLE IF NOT EXISTS {schema}.sync_configurations (
                    loan_type             TEXT PRIMARY KEY,
                    external_bank_url     TEXT NOT NULL,
                    sync_interval_minutes INT NOT NULL DEFAULT 60,
                    is_enabled            BOOLEAN NOT NULL DEFAULT TRUE,
                    last_sync_at          TIMESTAMPTZ,
                    last_sync_status      TEXT NOT NULL DEFAULT 'PENDING',
                    created_at            TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {schema}.sync_logs (
                    id                 UUID PRIMARY KEY,
                    loan_type          TEXT NOT NULL,
                    batch_id           UUID NOT NULL,
                    status             TEXT NOT NULL,
                    total_credit_rows  BIGINT NOT NULL DEFAULT 0,
                    total_payment_rows BIGINT NOT NULL DEFAULT 0,
                    valid_credit_rows  BIGINT NOT NULL DEFAULT 0,
                    valid_payment_rows BIGINT NOT NULL DEFAULT 0,
                    error_count        BIGINT NOT NULL DEFAULT 0,
                    error_summary      JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                    started_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
                    completed_at       TIMESTAMPTZ
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {schema}.validation_errors (
                    id            BIGSERIAL PRIMARY KEY,
                    sync_log_id   UUID NOT NULL REFERENCES {schema}.sync_logs(id) ON DELETE CASCADE,
                    row_number    BIGINT NOT NULL,
                    file_type     TEXT NOT NULL,
                    field_name    TEXT NOT NULL,
                    error_type    TEXT NOT NULL,
                    error_message TEXT NOT NULL,
                    raw_value     TEXT
                )"
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS validation_errors_sync_log_idx \
                 ON {schema}.validation_errors (sync_log_id)"
            ),
        ];

        for sql in &statements {
            sqlx::query(sql).execute(self.pool()).await.map_err(meta_err)?;
        }
        Ok(())
    }
}
