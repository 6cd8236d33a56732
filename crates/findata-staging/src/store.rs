use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use findata_core::{AdapterError, FileType, LoanType, RawRow, RedisSettings, FAILED_ROWS_TTL_SECS};

const UPLOAD_PREFIX: &str = "extbank:";
const FAILED_PREFIX: &str = "extbank_failed:";

fn staging_err(e: impl std::fmt::Display) -> AdapterError {
    AdapterError::Staging(e.to_string())
}

/// Redis-backed upload store shared by all workers.
///
/// Key layout per `(tenant, loan_type, file_type)`:
///   extbank:{t}:{l}:{f}:rows       — O(1) row counter, maintained on append
///   extbank:{t}:{l}:{f}:chunks     — number of stored chunks
///   extbank:{t}:{l}:{f}:chunk:{i}  — JSON array of row maps
///   extbank_failed:{t}:{l}:{f}     — list of failed raw rows (TTL-bounded)
#[derive(Clone)]
pub struct UploadStore {
    conn: ConnectionManager,
}

impl UploadStore {
    pub async fn connect(settings: &RedisSettings) -> Result<Self, AdapterError> {
        let client = redis::Client::open(settings.url()).map_err(staging_err)?;
        let conn = ConnectionManager::new(client).await.map_err(staging_err)?;
        Ok(Self { conn })
    }

    /// Reuse an already-established connection (lock and cache share it).
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    fn base_key(tenant_id: &str, loan_type: LoanType, file_type: FileType) -> String {
        format!("{UPLOAD_PREFIX}{tenant_id}:{loan_type}:{file_type}")
    }

    fn failed_key(tenant_id: &str, loan_type: LoanType, file_type: FileType) -> String {
        format!("{FAILED_PREFIX}{tenant_id}:{loan_type}:{file_type}")
    }

    // ── Upload data ──────────────────────────────────────────────────────────

    /// Number of uploaded rows, from the counter key. O(1).
    pub async fn row_count(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
    ) -> Result<u64, AdapterError> {
        let mut conn = self.conn.clone();
        let key = format!("{}:rows", Self::base_key(tenant_id, loan_type, file_type));
        let count: Option<u64> = conn.get(&key).await.map_err(staging_err)?;
        Ok(count.unwrap_or(0))
    }

    /// Append one chunk of rows, bumping both counters. Used by the upload
    /// path (CSV loader); the sync engine only reads.
    pub async fn append_rows(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
        rows: &[RawRow],
    ) -> Result<(), AdapterError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let base = Self::base_key(tenant_id, loan_type, file_type);
        let payload = serde_json::to_string(rows)
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;

        let index: u64 = conn
            .incr(format!("{base}:chunks"), 1u64)
            .await
            .map_err(staging_err)?;
        conn.set::<_, _, ()>(format!("{base}:chunk:{}", index - 1), payload)
            .await
            .map_err(staging_err)?;
        conn.incr::<_, _, u64>(format!("{base}:rows"), rows.len() as u64)
            .await
            .map_err(staging_err)?;
        debug!(
            tenant = tenant_id,
            loan_type = %loan_type,
            file_type = %file_type,
            rows = rows.len(),
            chunk = index - 1,
            "appended upload chunk"
        );
        Ok(())
    }

    /// Single-pass cursor over the stored chunks. Not restartable within one
    /// sync; memory footprint is one decoded chunk.
    pub fn chunks(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
    ) -> ChunkCursor {
        ChunkCursor {
            conn: self.conn.clone(),
            base: Self::base_key(tenant_id, loan_type, file_type),
            next: 0,
            total: None,
        }
    }

    /// Drop all upload keys for the triple. Called at the end of every sync.
    pub async fn clear_upload(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
    ) -> Result<(), AdapterError> {
        let mut conn = self.conn.clone();
        let base = Self::base_key(tenant_id, loan_type, file_type);
        let chunks: Option<u64> = conn
            .get(format!("{base}:chunks"))
            .await
            .map_err(staging_err)?;
        let mut keys: Vec<String> = (0..chunks.unwrap_or(0))
            .map(|i| format!("{base}:chunk:{i}"))
            .collect();
        keys.push(format!("{base}:chunks"));
        keys.push(format!("{base}:rows"));
        conn.del::<_, ()>(keys).await.map_err(staging_err)?;
        Ok(())
    }

    // ── Failed-row store ─────────────────────────────────────────────────────

    /// Append failed raw rows for later preview/download. TTL-bounded.
    pub async fn store_failed_rows(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
        rows: &[RawRow],
    ) -> Result<(), AdapterError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let key = Self::failed_key(tenant_id, loan_type, file_type);
        let encoded: Vec<String> = rows
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;
        conn.rpush::<_, _, ()>(&key, encoded)
            .await
            .map_err(staging_err)?;
        redis::cmd("EXPIRE")
            .arg(&key)
            .arg(FAILED_ROWS_TTL_SECS)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(staging_err)?;
        Ok(())
    }

    pub async fn clear_failed(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
    ) -> Result<(), AdapterError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::failed_key(tenant_id, loan_type, file_type))
            .await
            .map_err(staging_err)?;
        Ok(())
    }

    /// First `limit` failed rows for preview.
    pub async fn failed_rows(
        &self,
        tenant_id: &str,
        loan_type: LoanType,
        file_type: FileType,
        limit: isize,
    ) -> Result<Vec<RawRow>, AdapterError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(
                Self::failed_key(tenant_id, loan_type, file_type),
                0,
                limit - 1,
            )
            .await
            .map_err(staging_err)?;
        raw.iter()
            .map(|line| serde_json::from_str(line))
            .collect::<Result<_, _>>()
            .map_err(|e| AdapterError::Serialization(e.to_string()))
    }
}

// ── ChunkCursor ──────────────────────────────────────────────────────────────

/// Lazy, finite, single-pass chunk iterator over an upload.
pub struct ChunkCursor {
    conn: ConnectionManager,
    base: String,
    next: u64,
    total: Option<u64>,
}

impl ChunkCursor {
    /// Fetch and decode the next chunk, or `None` when the upload is
    /// exhausted. Missing chunk keys (expired mid-read) end the stream.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<RawRow>>, AdapterError> {
        let total = match self.total {
            Some(t) => t,
            None => {
                let count: Option<u64> = self
                    .conn
                    .get(format!("{}:chunks", self.base))
                    .await
                    .map_err(staging_err)?;
                let count = count.unwrap_or(0);
                self.total = Some(count);
                count
            }
        };

        if self.next >= total {
            return Ok(None);
        }
        let key = format!("{}:chunk:{}", self.base, self.next);
        self.next += 1;

        let payload: Option<String> = self.conn.get(&key).await.map_err(staging_err)?;
        match payload {
            Some(json) => {
                let rows: Vec<RawRow> = serde_json::from_str(&json)
                    .map_err(|e| AdapterError::Serialization(e.to_string()))?;
                Ok(Some(rows))
            }
            None => Ok(None),
        }
    }
}
