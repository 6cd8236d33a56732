pub mod schema;
pub mod sync_logs;
pub mod tenants;

pub use schema::checked_ident;
pub use tenants::{SyncConfigRecord, TenantRecord, TenantSeed};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use findata_core::{AdapterError, PgSettings};

pub(crate) fn meta_err(e: impl std::fmt::Display) -> AdapterError {
    AdapterError::Meta(e.to_string())
}

/// Relational store of sync metadata: a shared tenant registry plus one
/// schema per tenant holding sync_configurations, sync_logs and
/// validation_errors. Every call takes the target schema explicitly.
#[derive(Clone)]
pub struct MetaStore {
    pool: PgPool,
}

impl MetaStore {
    pub async fn connect(settings: &PgSettings) -> Result<Self, AdapterError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&settings.url())
            .await
            .map_err(meta_err)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
