use std::time::Duration;

use redis::aio::ConnectionManager;
use tracing::{debug, warn};

use findata_core::{AdapterError, LoanType, LOCK_POLL_INTERVAL_SECS};

fn staging_err(e: impl std::fmt::Display) -> AdapterError {
    AdapterError::Staging(e.to_string())
}

/// Distributed mutex over one `(tenant, loan_type)` pair.
///
/// A single `sync_lock:{tenant}:{loan_type}` key, written with SET NX EX and
/// holding the owning sync's batch id. The TTL guarantees eventual release if
/// the holder crashes; normal release deletes the key unconditionally.
/// Re-entry is not supported.
pub struct SyncLock {
    conn: ConnectionManager,
    key: String,
}

impl SyncLock {
    pub fn key_for(tenant_id: &str, loan_type: LoanType) -> String {
        format!("sync_lock:{tenant_id}:{loan_type}")
    }

    /// One shot acquisition attempt. `Ok(None)` means another sync holds the
    /// lock.
    pub async fn try_acquire(
        conn: &ConnectionManager,
        tenant_id: &str,
        loan_type: LoanType,
        token: &str,
        ttl_secs: u64,
    ) -> Result<Option<SyncLock>, AdapterError> {
        let key = Self::key_for(tenant_id, loan_type);
        let mut conn = conn.clone();
        let acquired: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(token)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(staging_err)?;

        if acquired.is_none() {
            return Ok(None);
        }
        debug!(key = %key, "acquired sync lock");
        Ok(Some(SyncLock { conn, key }))
    }

    /// Acquire, polling every [`LOCK_POLL_INTERVAL_SECS`] until the TTL
    /// window elapses. `Ok(None)` once the deadline passes.
    pub async fn acquire_waiting(
        conn: &ConnectionManager,
        tenant_id: &str,
        loan_type: LoanType,
        token: &str,
        ttl_secs: u64,
    ) -> Result<Option<SyncLock>, AdapterError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(ttl_secs);
        loop {
            if let Some(lock) =
                Self::try_acquire(conn, tenant_id, loan_type, token, ttl_secs).await?
            {
                return Ok(Some(lock));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_secs(LOCK_POLL_INTERVAL_SECS)).await;
        }
    }

    /// Unconditional delete. Best-effort: a failed delete only means the TTL
    /// does the job.
    pub async fn release(mut self) {
        if let Err(e) = redis::cmd("DEL")
            .arg(&self.key)
            .query_async::<_, ()>(&mut self.conn)
            .await
        {
            warn!(key = %self.key, error = %e, "failed to release sync lock; TTL will expire it");
        }
    }
}
