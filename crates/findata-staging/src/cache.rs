//! Tenant-aware Redis caches.
//!
//! All operations are safe to call when Redis misbehaves: failures are
//! logged and the caller falls through to the backing store. Keys follow
//! `{tenant_id}:{resource}:{discriminator}`.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{info, warn};

use findata_core::LoanType;

// ── TTLs (seconds) ───────────────────────────────────────────────────────────

pub const TTL_SYNC_CONFIG: u64 = 120;
pub const TTL_SYNC_LOGS: u64 = 60;
pub const TTL_WAREHOUSE_COUNT: u64 = 300;
pub const TTL_PROFILE: u64 = 600;
pub const TTL_EXISTING_LOANS: u64 = 300;

// ── Key builders ─────────────────────────────────────────────────────────────

fn key(tenant_id: &str, resource: &str, parts: &[&str]) -> String {
    let mut segments = vec![tenant_id, resource];
    segments.extend_from_slice(parts);
    segments.join(":")
}

pub fn sync_configs_key(tenant_id: &str) -> String {
    key(tenant_id, "sync_configs", &[])
}

pub fn sync_logs_key(tenant_id: &str, limit: u32) -> String {
    key(tenant_id, "sync_logs", &["recent", &limit.to_string()])
}

pub fn warehouse_count_key(tenant_id: &str, table: &str, loan_type: LoanType) -> String {
    key(tenant_id, "ch_count", &[table, loan_type.as_str()])
}

pub fn profile_key(tenant_id: &str, loan_type: LoanType, data_type: &str) -> String {
    key(tenant_id, "profile", &[loan_type.as_str(), data_type])
}

pub fn existing_loans_key(tenant_id: &str, loan_type: LoanType) -> String {
    key(tenant_id, "existing_loans", &[loan_type.as_str()])
}

// ── Cache handle ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Cached JSON value, or `None` on miss or any Redis failure.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(cache_key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key = cache_key, error = %e, "cache GET failed");
                None
            }
        }
    }

    /// Store a JSON value with a TTL. Failures are logged and swallowed.
    pub async fn set_json<T: serde::Serialize>(&self, cache_key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = cache_key, error = %e, "cache encode failed");
                return;
            }
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(cache_key, raw, ttl_secs)
            .await
        {
            warn!(key = cache_key, error = %e, "cache SET failed");
        }
    }

    pub async fn delete_many(&self, keys: &[String]) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(keys.to_vec()).await {
            warn!(count = keys.len(), error = %e, "cache DELETE failed");
        }
    }

    /// Drop every cache that goes stale once a sync terminates (success or
    /// failure) for the pair.
    pub async fn invalidate_after_sync(&self, tenant_id: &str, loan_type: LoanType) {
        let keys = vec![
            sync_configs_key(tenant_id),
            sync_logs_key(tenant_id, 10),
            sync_logs_key(tenant_id, 20),
            warehouse_count_key(tenant_id, "fact_credit", loan_type),
            warehouse_count_key(tenant_id, "fact_payment", loan_type),
            profile_key(tenant_id, loan_type, "credit"),
            profile_key(tenant_id, loan_type, "payment"),
            existing_loans_key(tenant_id, loan_type),
        ];
        info!(
            tenant = tenant_id,
            loan_type = %loan_type,
            keys = keys.len(),
            "invalidating caches after sync"
        );
        self.delete_many(&keys).await;
    }
}
