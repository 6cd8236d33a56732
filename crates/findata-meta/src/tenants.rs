use chrono::{DateTime, Utc};
use sqlx::Row;

use findata_core::{AdapterError, LoanType};

use crate::schema::checked_ident;
use crate::{meta_err, MetaStore};

/// Registry row used when provisioning.
#[derive(Clone, Debug)]
pub struct TenantSeed {
    pub tenant_id: String,
    pub name: String,
    pub pg_schema: String,
    pub ch_database: String,
}

/// Registry row as read back.
#[derive(Clone, Debug)]
pub struct TenantRecord {
    pub tenant_id: String,
    pub name: String,
    pub pg_schema: String,
    pub ch_database: String,
    pub is_active: bool,
}

/// One loan type's sync settings inside a tenant schema.
#[derive(Clone, Debug)]
pub struct SyncConfigRecord {
    pub loan_type: LoanType,
    pub external_bank_url: String,
    pub sync_interval_minutes: i32,
    pub is_enabled: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: String,
}

impl MetaStore {
    // ── Tenant registry ──────────────────────────────────────────────────────

    pub async fn upsert_tenant(&self, seed: &TenantSeed) -> Result<bool, AdapterError> {
        let result = sqlx::query(
            "INSERT INTO public.tenants (tenant_id, name, pg_schema, ch_database) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (tenant_id) DO NOTHING",
        )
        .bind(&seed.tenant_id)
        .bind(&seed.name)
        .bind(&seed.pg_schema)
        .bind(&seed.ch_database)
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> Result<Option<TenantRecord>, AdapterError> {
        let row = sqlx::query(
            "SELECT tenant_id, name, pg_schema, ch_database, is_active \
             FROM public.tenants WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(self.pool())
        .await
        .map_err(meta_err)?;

        Ok(row.map(|r| TenantRecord {
            tenant_id: r.get("tenant_id"),
            name: r.get("name"),
            pg_schema: r.get("pg_schema"),
            ch_database: r.get("ch_database"),
            is_active: r.get("is_active"),
        }))
    }

    pub async fn list_active_tenants(&self) -> Result<Vec<TenantRecord>, AdapterError> {
        let rows = sqlx::query(
            "SELECT tenant_id, name, pg_schema, ch_database, is_active \
             FROM public.tenants WHERE is_active ORDER BY tenant_id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(meta_err)?;

        Ok(rows
            .into_iter()
            .map(|r| TenantRecord {
                tenant_id: r.get("tenant_id"),
                name: r.get("name"),
                pg_schema: r.get("pg_schema"),
                ch_database: r.get("ch_database"),
                is_active: r.get("is_active"),
            })
            .collect())
    }

    // ── Sync configurations ──────────────────────────────────────────────────

    /// Seed RETAIL and COMMERCIAL configs for a tenant schema, leaving
    /// existing rows untouched.
    pub async fn ensure_default_configs(
        &self,
        pg_schema: &str,
        external_bank_url: &str,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        for loan_type in LoanType::ALL {
            sqlx::query(&format!(
                "INSERT INTO {schema}.sync_configurations (loan_type, external_bank_url) \
                 VALUES ($1, $2) ON CONFLICT (loan_type) DO NOTHING"
            ))
            .bind(loan_type.as_str())
            .bind(external_bank_url)
            .execute(self.pool())
            .await
            .map_err(meta_err)?;
        }
        Ok(())
    }

    pub async fn get_config(
        &self,
        pg_schema: &str,
        loan_type: LoanType,
    ) -> Result<Option<SyncConfigRecord>, AdapterError> {
        let schema = checked_ident(pg_schema)?;
        let row = sqlx::query(&format!(
            "SELECT external_bank_url, sync_interval_minutes, is_enabled, \
                    last_sync_at, last_sync_status \
             FROM {schema}.sync_configurations WHERE loan_type = $1"
        ))
        .bind(loan_type.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(meta_err)?;

        Ok(row.map(|r| SyncConfigRecord {
            loan_type,
            external_bank_url: r.get("external_bank_url"),
            sync_interval_minutes: r.get("sync_interval_minutes"),
            is_enabled: r.get("is_enabled"),
            last_sync_at: r.get("last_sync_at"),
            last_sync_status: r.get("last_sync_status"),
        }))
    }

    /// Stamp the loan type's config after a terminal sync. A missing config
    /// row is not an error.
    pub async fn touch_config(
        &self,
        pg_schema: &str,
        loan_type: LoanType,
        status: &str,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        sqlx::query(&format!(
            "UPDATE {schema}.sync_configurations \
             SET last_sync_at = now(), last_sync_status = $1 WHERE loan_type = $2"
        ))
        .bind(status)
        .bind(loan_type.as_str())
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(())
    }
}
