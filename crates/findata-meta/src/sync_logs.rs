use sqlx::QueryBuilder;
use tracing::debug;
use uuid::Uuid;

use findata_core::{
    AdapterError, FieldError, FileType, SyncLog, SyncStatus, ERROR_INSERT_BATCH_SIZE,
};

use crate::schema::checked_ident;
use crate::{meta_err, MetaStore};

impl MetaStore {
    // ── Sync logs ────────────────────────────────────────────────────────────

    /// Persist a freshly opened sync log.
    pub async fn insert_sync_log(
        &self,
        pg_schema: &str,
        log: &SyncLog,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        sqlx::query(&format!(
            "INSERT INTO {schema}.sync_logs \
             (id, loan_type, batch_id, status, started_at) \
             VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(log.id)
        .bind(log.loan_type.as_str())
        .bind(log.batch_id)
        .bind(log.status.as_str())
        .bind(log.started_at)
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(())
    }

    /// Idempotent single-column status transition, persisted so external
    /// observers can watch progress.
    pub async fn update_status(
        &self,
        pg_schema: &str,
        log_id: Uuid,
        status: SyncStatus,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        sqlx::query(&format!(
            "UPDATE {schema}.sync_logs SET status = $1 WHERE id = $2"
        ))
        .bind(status.as_str())
        .bind(log_id)
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(())
    }

    /// Record the O(1) row counts discovered at fetch time.
    pub async fn update_totals(
        &self,
        pg_schema: &str,
        log_id: Uuid,
        total_credit_rows: i64,
        total_payment_rows: i64,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        sqlx::query(&format!(
            "UPDATE {schema}.sync_logs \
             SET total_credit_rows = $1, total_payment_rows = $2 WHERE id = $3"
        ))
        .bind(total_credit_rows)
        .bind(total_payment_rows)
        .bind(log_id)
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(())
    }

    /// Write the terminal state: status, counters, summary, completion time.
    pub async fn finalize_sync_log(
        &self,
        pg_schema: &str,
        log: &SyncLog,
    ) -> Result<(), AdapterError> {
        let schema = checked_ident(pg_schema)?;
        let summary = serde_json::to_value(&log.error_summary)
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;
        sqlx::query(&format!(
            "UPDATE {schema}.sync_logs \
             SET status = $1, total_credit_rows = $2, total_payment_rows = $3, \
                 valid_credit_rows = $4, valid_payment_rows = $5, error_count = $6, \
                 error_summary = $7, completed_at = $8 \
             WHERE id = $9"
        ))
        .bind(log.status.as_str())
        .bind(log.total_credit_rows)
        .bind(log.total_payment_rows)
        .bind(log.valid_credit_rows)
        .bind(log.valid_payment_rows)
        .bind(log.error_count)
        .bind(summary)
        .bind(log.completed_at)
        .bind(log.id)
        .execute(self.pool())
        .await
        .map_err(meta_err)?;
        Ok(())
    }

    // ── Validation errors ────────────────────────────────────────────────────

    /// Bulk-persist error descriptors for one file type, in fixed-size
    /// batches so persistence never dominates memory.
    pub async fn persist_validation_errors(
        &self,
        pg_schema: &str,
        log_id: Uuid,
        file_type: FileType,
        errors: &[FieldError],
    ) -> Result<(), AdapterError> {
        if errors.is_empty() {
            return Ok(());
        }
        let schema = checked_ident(pg_schema)?;

        for batch in errors.chunks(ERROR_INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {schema}.validation_errors \
                 (sync_log_id, row_number, file_type, field_name, error_type, \
                  error_message, raw_value) "
            ));
            builder.push_values(batch, |mut b, err| {
                b.push_bind(log_id)
                    .push_bind(err.row_number as i64)
                    .push_bind(file_type.as_str())
                    .push_bind(&err.field_name)
                    .push_bind(err.kind.as_str())
                    .push_bind(&err.message)
                    .push_bind(&err.raw_value);
            });
            builder
                .build()
                .execute(self.pool())
                .await
                .map_err(meta_err)?;
        }
        debug!(
            sync_log = %log_id,
            file_type = %file_type,
            count = errors.len(),
            "persisted validation errors"
        );
        Ok(())
    }
}
