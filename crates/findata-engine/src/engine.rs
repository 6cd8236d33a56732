use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use findata_core::{
    AdapterError, FieldError, FileType, LoanType, RawRow, Settings, SyncLog, SyncStatus,
    TenantSnapshot, INSERT_BATCH_SIZE, MAX_ERRORS_PER_FILE, MAX_FAILED_ROWS_PER_FILE,
};
use findata_meta::MetaStore;
use findata_staging::cache::{existing_loans_key, TTL_EXISTING_LOANS};
use findata_staging::{Cache, SyncLock, UploadStore};
use findata_validate::{check_loan_reference, validate_credit_row, validate_payment_row};
use findata_warehouse::{CreditRow, PaymentRow, StorageManager};

use crate::fetcher::DataFetcher;
use crate::metrics::SyncMetrics;

// ── Per-file bookkeeping ─────────────────────────────────────────────────────

/// Counters and bounded diagnostic buffers for one file type.
///
/// `rows_seen` doubles as the global row index: monotonically increasing
/// across streamed chunks, starting at 1. Overflowing the failed-row or
/// error buffers drops the payload but never the counts.
#[derive(Default)]
struct FileCollector {
    rows_seen: u64,
    valid_rows: u64,
    error_count: u64,
    errors: Vec<FieldError>,
    failed_rows: Vec<RawRow>,
    dropped_failed_rows: u64,
    kind_counts: BTreeMap<&'static str, u64>,
    summary: BTreeMap<String, u64>,
}

impl FileCollector {
    fn next_row_number(&mut self) -> u64 {
        self.rows_seen += 1;
        self.rows_seen
    }

    fn record_valid(&mut self) {
        self.valid_rows += 1;
    }

    fn record_invalid(&mut self, row: RawRow, errors: Vec<FieldError>) {
        self.error_count += errors.len() as u64;
        for err in &errors {
            *self.summary.entry(err.summary_key()).or_default() += 1;
            *self.kind_counts.entry(err.kind.as_str()).or_default() += 1;
        }
        let room = MAX_ERRORS_PER_FILE.saturating_sub(self.errors.len());
        self.errors.extend(errors.into_iter().take(room));

        if self.failed_rows.len() < MAX_FAILED_ROWS_PER_FILE {
            self.failed_rows.push(row);
        } else {
            self.dropped_failed_rows += 1;
        }
    }
}

/// How the pipeline ended when no error escaped it.
enum Disposition {
    Committed,
    Aborted,
}

fn error_rate_exceeded(total_rows: i64, valid_rows: i64, max_error_rate: f64) -> bool {
    if total_rows <= 0 {
        return false;
    }
    let invalid = (total_rows - valid_rows) as f64;
    invalid / total_rows as f64 > max_error_rate
}

fn abort_reason(max_error_rate: f64) -> String {
    format!(
        "Error rate exceeds {:.0}%. Aborting sync, old data preserved.",
        max_error_rate * 100.0
    )
}

fn merged_summary(
    credit: &FileCollector,
    payment: &FileCollector,
) -> BTreeMap<String, serde_json::Value> {
    let mut merged: BTreeMap<String, u64> = credit.summary.clone();
    for (key, count) in &payment.summary {
        *merged.entry(key.clone()).or_default() += count;
    }
    merged
        .into_iter()
        .map(|(key, count)| (key, json!(count)))
        .collect()
}

// ── SyncEngine ───────────────────────────────────────────────────────────────

/// Orchestrates one tenant's sync pipeline.
///
/// `sync` always returns a terminal [`SyncLog`]; internal failures are
/// captured as `FAILED`, never propagated. The distributed lock is held for
/// the whole invocation and released on every exit path (its TTL covers a
/// crash).
pub struct SyncEngine {
    tenant: TenantSnapshot,
    settings: Settings,
    fetcher: DataFetcher,
    uploads: UploadStore,
    cache: Cache,
    storage: StorageManager,
    meta: MetaStore,
    metrics: Arc<SyncMetrics>,
}

impl SyncEngine {
    pub fn new(
        tenant: TenantSnapshot,
        settings: Settings,
        uploads: UploadStore,
        meta: MetaStore,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        let storage = StorageManager::new(&settings.clickhouse, &tenant.ch_database);
        let fetcher = DataFetcher::new(uploads.clone(), tenant.tenant_id.clone());
        let cache = Cache::new(uploads.connection());
        Self {
            tenant,
            settings,
            fetcher,
            uploads,
            cache,
            storage,
            meta,
            metrics,
        }
    }

    /// Run the full pipeline for one loan type.
    ///
    /// With `wait_for_lock`, a contended lock is polled until the TTL window
    /// elapses; otherwise contention fails fast with a `FAILED` log whose
    /// summary carries `reason = "Concurrent sync in progress"`.
    pub async fn sync(&self, loan_type: LoanType, wait_for_lock: bool) -> SyncLog {
        let started = Instant::now();
        let mut log = SyncLog::new(loan_type);
        info!(
            tenant = %self.tenant.tenant_id,
            loan_type = %loan_type,
            batch_id = %log.batch_id,
            "sync starting"
        );

        // ── Acquire the distributed lock ──────────────────────────────────────
        let conn = self.uploads.connection();
        let token = log.batch_id.to_string();
        let ttl = self.settings.sync_lock_ttl_secs;
        let attempt = if wait_for_lock {
            SyncLock::acquire_waiting(&conn, &self.tenant.tenant_id, loan_type, &token, ttl).await
        } else {
            SyncLock::try_acquire(&conn, &self.tenant.tenant_id, loan_type, &token, ttl).await
        };
        let lock = match attempt {
            Ok(Some(lock)) => lock,
            Ok(None) => {
                warn!(
                    tenant = %self.tenant.tenant_id,
                    loan_type = %loan_type,
                    "another sync holds the lock; rejecting"
                );
                return self
                    .close_rejected(log, "Concurrent sync in progress", started)
                    .await;
            }
            Err(e) => {
                error!(error = %e, "lock store unavailable");
                return self
                    .close_rejected(log, &format!("lock store unavailable: {e}"), started)
                    .await;
            }
        };

        // ── Open the sync log ─────────────────────────────────────────────────
        if let Err(e) = self.meta.insert_sync_log(&self.tenant.pg_schema, &log).await {
            error!(error = %e, "could not open sync log");
            lock.release().await;
            log.status = SyncStatus::Failed;
            log.error_summary
                .insert("exception".to_string(), json!(e.to_string()));
            log.completed_at = Some(Utc::now());
            self.emit_metrics(&log, started.elapsed(), &FileCollector::default(), &FileCollector::default());
            return log;
        }

        // ── Pipeline ──────────────────────────────────────────────────────────
        let mut credit = FileCollector::default();
        let mut payment = FileCollector::default();
        let disposition = self
            .run_pipeline(&mut log, loan_type, &mut credit, &mut payment)
            .await;

        log.valid_credit_rows = credit.valid_rows as i64;
        log.valid_payment_rows = payment.valid_rows as i64;
        log.error_count = (credit.error_count + payment.error_count) as i64;

        match disposition {
            Ok(Disposition::Committed) => {
                log.status = SyncStatus::Completed;
                log.error_summary = merged_summary(&credit, &payment);
            }
            Ok(Disposition::Aborted) => {
                log.status = SyncStatus::Failed;
                let mut summary = merged_summary(&credit, &payment);
                summary.insert(
                    "reason".to_string(),
                    json!(abort_reason(self.settings.max_error_rate)),
                );
                log.error_summary = summary;
                warn!(
                    tenant = %self.tenant.tenant_id,
                    loan_type = %loan_type,
                    error_count = log.error_count,
                    "sync aborted; fact tables preserved"
                );
            }
            Err(e) => {
                error!(error = %e, "sync pipeline failed");
                for file_type in FileType::ALL {
                    if let Err(te) = self.storage.truncate_staging(file_type).await {
                        warn!(error = %te, file_type = %file_type, "staging cleanup failed");
                    }
                }
                log.status = SyncStatus::Failed;
                let mut summary = merged_summary(&credit, &payment);
                summary.insert("exception".to_string(), json!(e.to_string()));
                log.error_summary = summary;
            }
        }
        log.completed_at = Some(Utc::now());

        // ── Terminal duties ───────────────────────────────────────────────────
        self.finalize(&log, &credit, &payment, started.elapsed())
            .await;
        lock.release().await;

        info!(
            tenant = %self.tenant.tenant_id,
            loan_type = %loan_type,
            status = %log.status,
            valid_credit = log.valid_credit_rows,
            valid_payment = log.valid_payment_rows,
            errors = log.error_count,
            "sync finished"
        );
        log
    }

    // ── Pipeline phases ──────────────────────────────────────────────────────

    async fn run_pipeline(
        &self,
        log: &mut SyncLog,
        loan_type: LoanType,
        credit: &mut FileCollector,
        payment: &mut FileCollector,
    ) -> Result<Disposition, AdapterError> {
        self.set_status(log, SyncStatus::Fetching).await?;
        log.total_credit_rows = self.fetcher.row_count(loan_type, FileType::Credit).await? as i64;
        log.total_payment_rows = self
            .fetcher
            .row_count(loan_type, FileType::PaymentPlan)
            .await? as i64;
        self.meta
            .update_totals(
                &self.tenant.pg_schema,
                log.id,
                log.total_credit_rows,
                log.total_payment_rows,
            )
            .await?;

        let loaded_at = Utc::now().timestamp();
        let batch_loans = self
            .credit_phase(log, loan_type, credit, loaded_at)
            .await?;
        self.payment_phase(log, loan_type, payment, &batch_loans, loaded_at)
            .await?;

        // ── Error-rate gate ───────────────────────────────────────────────────
        let total = log.total_credit_rows + log.total_payment_rows;
        let valid = (credit.valid_rows + payment.valid_rows) as i64;
        if error_rate_exceeded(total, valid, self.settings.max_error_rate) {
            for file_type in FileType::ALL {
                self.storage.truncate_staging(file_type).await?;
            }
            return Ok(Disposition::Aborted);
        }

        // ── Commit ────────────────────────────────────────────────────────────
        if credit.valid_rows > 0 {
            self.storage
                .replace_partition(FileType::Credit, loan_type)
                .await?;
        }
        if payment.valid_rows > 0 {
            self.storage
                .replace_partition(FileType::PaymentPlan, loan_type)
                .await?;
        }
        for file_type in FileType::ALL {
            self.storage.truncate_staging(file_type).await?;
        }
        Ok(Disposition::Committed)
    }

    /// Stream credit chunks: validate, collect the batch loan set, normalize
    /// into typed rows, and flush to staging in bounded batches.
    async fn credit_phase(
        &self,
        log: &mut SyncLog,
        loan_type: LoanType,
        credit: &mut FileCollector,
        loaded_at: i64,
    ) -> Result<HashSet<String>, AdapterError> {
        self.storage.truncate_staging(FileType::Credit).await?;

        let mut batch_loans: HashSet<String> = HashSet::new();
        let mut buffer: Vec<CreditRow> = Vec::new();
        let mut cursor = self.fetcher.chunks(loan_type, FileType::Credit);

        while let Some(chunk) = cursor.next_chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            self.set_status(log, SyncStatus::Validating).await?;
            let mut valid_raws: Vec<RawRow> = Vec::new();
            for row in chunk {
                let row_number = credit.next_row_number();
                let errors = validate_credit_row(&row, row_number, loan_type);
                if errors.is_empty() {
                    if let Some(loan) = row.get("loan_account_number") {
                        let loan = loan.trim();
                        if !loan.is_empty() {
                            batch_loans.insert(loan.to_string());
                        }
                    }
                    valid_raws.push(row);
                } else {
                    credit.record_invalid(row, errors);
                }
            }
            if valid_raws.is_empty() {
                continue;
            }

            self.set_status(log, SyncStatus::Normalizing).await?;
            for raw in &valid_raws {
                buffer.push(CreditRow::from_raw(raw, loan_type, log.batch_id, loaded_at));
                credit.record_valid();
            }
            drop(valid_raws);

            if buffer.len() >= INSERT_BATCH_SIZE {
                self.set_status(log, SyncStatus::Storing).await?;
                self.storage
                    .insert_staging(FileType::Credit, &buffer)
                    .await?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            self.set_status(log, SyncStatus::Storing).await?;
            self.storage
                .insert_staging(FileType::Credit, &buffer)
                .await?;
        }
        Ok(batch_loans)
    }

    /// Stream payment chunks: field-validate, cross-check the loan reference
    /// against batch ∪ warehouse credits, normalize, flush.
    async fn payment_phase(
        &self,
        log: &mut SyncLog,
        loan_type: LoanType,
        payment: &mut FileCollector,
        batch_loans: &HashSet<String>,
        loaded_at: i64,
    ) -> Result<(), AdapterError> {
        self.storage.truncate_staging(FileType::PaymentPlan).await?;

        let known_loans = self.known_loans(loan_type, batch_loans).await;
        let mut buffer: Vec<PaymentRow> = Vec::new();
        let mut cursor = self.fetcher.chunks(loan_type, FileType::PaymentPlan);

        while let Some(chunk) = cursor.next_chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            self.set_status(log, SyncStatus::Validating).await?;
            let mut valid_raws: Vec<RawRow> = Vec::new();
            for row in chunk {
                let row_number = payment.next_row_number();
                let mut errors = validate_payment_row(&row, row_number, loan_type);
                if errors.is_empty() {
                    if let Some(err) = check_loan_reference(&row, row_number, &known_loans) {
                        errors.push(err);
                    }
                }
                if errors.is_empty() {
                    valid_raws.push(row);
                } else {
                    payment.record_invalid(row, errors);
                }
            }
            if valid_raws.is_empty() {
                continue;
            }

            self.set_status(log, SyncStatus::Normalizing).await?;
            for raw in &valid_raws {
                buffer.push(PaymentRow::from_raw(raw, loan_type, log.batch_id, loaded_at));
                payment.record_valid();
            }
            drop(valid_raws);

            if buffer.len() >= INSERT_BATCH_SIZE {
                self.set_status(log, SyncStatus::Storing).await?;
                self.storage
                    .insert_staging(FileType::PaymentPlan, &buffer)
                    .await?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            self.set_status(log, SyncStatus::Storing).await?;
            self.storage
                .insert_staging(FileType::PaymentPlan, &buffer)
                .await?;
        }
        Ok(())
    }

    /// Loan accounts a payment may reference: the current batch plus the
    /// already-committed partition. When the warehouse read fails the sync
    /// degrades to batch-only with a warning instead of failing outright.
    async fn known_loans(
        &self,
        loan_type: LoanType,
        batch_loans: &HashSet<String>,
    ) -> HashSet<String> {
        let cache_key = existing_loans_key(&self.tenant.tenant_id, loan_type);
        let existing: HashSet<String> = match self.cache.get_json::<Vec<String>>(&cache_key).await {
            Some(cached) => cached.into_iter().collect(),
            None => match self.storage.distinct_loan_ids(loan_type).await {
                Ok(loans) => {
                    let listed: Vec<&String> = loans.iter().collect();
                    self.cache
                        .set_json(&cache_key, &listed, TTL_EXISTING_LOANS)
                        .await;
                    loans
                }
                Err(e) => {
                    warn!(
                        tenant = %self.tenant.tenant_id,
                        loan_type = %loan_type,
                        error = %e,
                        "could not fetch existing loans; cross-validation uses batch credits only"
                    );
                    HashSet::new()
                }
            },
        };
        batch_loans.union(&existing).cloned().collect()
    }

    // ── Terminal paths ───────────────────────────────────────────────────────

    /// Open-and-close a FAILED log without ever holding the lock (contention
    /// or lock-store failure). Uploads, caches and the sync configuration are
    /// left alone: a competing sync owns them.
    async fn close_rejected(&self, mut log: SyncLog, reason: &str, started: Instant) -> SyncLog {
        log.status = SyncStatus::Failed;
        log.error_summary
            .insert("reason".to_string(), json!(reason));
        log.completed_at = Some(Utc::now());

        if let Err(e) = self.meta.insert_sync_log(&self.tenant.pg_schema, &log).await {
            warn!(error = %e, "could not persist rejected sync log");
        } else if let Err(e) = self
            .meta
            .finalize_sync_log(&self.tenant.pg_schema, &log)
            .await
        {
            warn!(error = %e, "could not finalize rejected sync log");
        }

        self.emit_metrics(
            &log,
            started.elapsed(),
            &FileCollector::default(),
            &FileCollector::default(),
        );
        log
    }

    /// Duties owed after every locked terminal transition: persist the log
    /// and diagnostics, move failed rows aside, clear the upload, publish
    /// metrics, invalidate caches, stamp the sync configuration. All
    /// best-effort; the returned log is already terminal.
    async fn finalize(
        &self,
        log: &SyncLog,
        credit: &FileCollector,
        payment: &FileCollector,
        elapsed: Duration,
    ) {
        let schema = &self.tenant.pg_schema;
        if let Err(e) = self.meta.finalize_sync_log(schema, log).await {
            warn!(error = %e, "could not finalize sync log");
        }

        for (file_type, collector) in [
            (FileType::Credit, credit),
            (FileType::PaymentPlan, payment),
        ] {
            if let Err(e) = self
                .meta
                .persist_validation_errors(schema, log.id, file_type, &collector.errors)
                .await
            {
                warn!(error = %e, file_type = %file_type, "could not persist validation errors");
            }
            if collector.dropped_failed_rows > 0 {
                warn!(
                    file_type = %file_type,
                    dropped = collector.dropped_failed_rows,
                    "failed-row buffer overflowed; overflow rows counted but not retained"
                );
            }
            self.move_failed_rows(log.loan_type, file_type, collector)
                .await;
        }

        self.emit_metrics(log, elapsed, credit, payment);
        self.cache
            .invalidate_after_sync(&self.tenant.tenant_id, log.loan_type)
            .await;
        if let Err(e) = self
            .meta
            .touch_config(schema, log.loan_type, log.status.as_str())
            .await
        {
            warn!(error = %e, "could not update sync configuration");
        }
    }

    /// Clear the consumed upload and park failed raw rows for preview. A
    /// clean file type also clears any stale failed rows from earlier runs.
    async fn move_failed_rows(
        &self,
        loan_type: LoanType,
        file_type: FileType,
        collector: &FileCollector,
    ) {
        let tenant_id = &self.tenant.tenant_id;
        if let Err(e) = self
            .uploads
            .clear_upload(tenant_id, loan_type, file_type)
            .await
        {
            warn!(error = %e, file_type = %file_type, "could not clear upload");
        }
        let result = if collector.failed_rows.is_empty() {
            self.uploads
                .clear_failed(tenant_id, loan_type, file_type)
                .await
        } else {
            self.uploads
                .store_failed_rows(tenant_id, loan_type, file_type, &collector.failed_rows)
                .await
        };
        if let Err(e) = result {
            warn!(error = %e, file_type = %file_type, "could not update failed-row store");
        }
    }

    fn emit_metrics(
        &self,
        log: &SyncLog,
        elapsed: Duration,
        credit: &FileCollector,
        payment: &FileCollector,
    ) {
        let tenant = self.tenant.tenant_id.as_str();
        let loan_type = log.loan_type.as_str();
        self.metrics
            .sync_operations_total
            .with_label_values(&[tenant, loan_type, log.status.as_str()])
            .inc();
        self.metrics
            .sync_duration_seconds
            .with_label_values(&[tenant, loan_type])
            .observe(elapsed.as_secs_f64());

        let mut kind_counts = credit.kind_counts.clone();
        for (kind, count) in &payment.kind_counts {
            *kind_counts.entry(*kind).or_default() += *count;
        }
        for (kind, count) in kind_counts {
            self.metrics
                .validation_errors_total
                .with_label_values(&[tenant, kind])
                .inc_by(count);
        }

        if log.status == SyncStatus::Completed {
            self.metrics
                .rows_inserted_total
                .with_label_values(&[tenant, "fact_credit"])
                .inc_by(credit.valid_rows);
            self.metrics
                .rows_inserted_total
                .with_label_values(&[tenant, "fact_payment"])
                .inc_by(payment.valid_rows);
        }
    }

    async fn set_status(&self, log: &mut SyncLog, status: SyncStatus) -> Result<(), AdapterError> {
        if log.status == status {
            return Ok(());
        }
        log.status = status;
        self.meta
            .update_status(&self.tenant.pg_schema, log.id, status)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use findata_core::ErrorKind;

    fn field_error(row_number: u64, field: &str, kind: ErrorKind) -> FieldError {
        FieldError {
            row_number,
            field_name: field.to_string(),
            kind,
            message: format!("{field} rejected"),
            raw_value: None,
        }
    }

    // ── Error-rate gate ──────────────────────────────────────────────────────

    #[test]
    fn gate_is_strictly_greater_than() {
        // Exactly 50% invalid: 2 total, 1 valid. Not aborted.
        assert!(!error_rate_exceeded(2, 1, 0.50));
        // 6 of 10 invalid: aborted.
        assert!(error_rate_exceeded(10, 4, 0.50));
        // Just over the line.
        assert!(error_rate_exceeded(1000, 499, 0.50));
    }

    #[test]
    fn gate_ignores_empty_datasets() {
        assert!(!error_rate_exceeded(0, 0, 0.50));
    }

    #[test]
    fn gate_honours_configured_rate() {
        assert!(error_rate_exceeded(10, 7, 0.25));
        assert!(!error_rate_exceeded(10, 8, 0.25));
    }

    // ── FileCollector ────────────────────────────────────────────────────────

    #[test]
    fn row_numbers_are_monotonic_across_chunks() {
        let mut collector = FileCollector::default();
        let first_chunk: Vec<u64> = (0..3).map(|_| collector.next_row_number()).collect();
        let second_chunk: Vec<u64> = (0..2).map(|_| collector.next_row_number()).collect();
        assert_eq!(first_chunk, vec![1, 2, 3]);
        assert_eq!(second_chunk, vec![4, 5]);
    }

    #[test]
    fn failed_row_buffer_caps_but_keeps_counting() {
        let mut collector = FileCollector::default();
        for _ in 0..(MAX_FAILED_ROWS_PER_FILE + 1) {
            let row_number = collector.next_row_number();
            collector.record_invalid(
                RawRow::new(),
                vec![field_error(row_number, "customer_id", ErrorKind::Required)],
            );
        }
        assert_eq!(collector.failed_rows.len(), MAX_FAILED_ROWS_PER_FILE);
        assert_eq!(collector.dropped_failed_rows, 1);
        assert_eq!(collector.error_count, MAX_FAILED_ROWS_PER_FILE as u64 + 1);
    }

    #[test]
    fn multi_error_rows_count_each_field_error() {
        let mut collector = FileCollector::default();
        collector.record_invalid(
            RawRow::new(),
            vec![
                field_error(1, "customer_id", ErrorKind::Required),
                field_error(1, "customer_type", ErrorKind::Value),
            ],
        );
        collector.record_valid();
        assert_eq!(collector.error_count, 2);
        assert_eq!(collector.valid_rows, 1);
        assert_eq!(collector.failed_rows.len(), 1);
        assert_eq!(collector.summary.get("customer_id:REQUIRED"), Some(&1));
        assert_eq!(collector.summary.get("customer_type:VALUE"), Some(&1));
    }

    // ── Summary merging ──────────────────────────────────────────────────────

    #[test]
    fn summaries_merge_by_key() {
        let mut credit = FileCollector::default();
        credit.record_invalid(
            RawRow::new(),
            vec![field_error(1, "loan_account_number", ErrorKind::Required)],
        );
        let mut payment = FileCollector::default();
        payment.record_invalid(
            RawRow::new(),
            vec![
                field_error(1, "loan_account_number", ErrorKind::Required),
                field_error(2, "loan_account_number", ErrorKind::CrossReference),
            ],
        );

        let merged = merged_summary(&credit, &payment);
        assert_eq!(
            merged.get("loan_account_number:REQUIRED"),
            Some(&json!(2u64))
        );
        assert_eq!(
            merged.get("loan_account_number:CROSS_REFERENCE"),
            Some(&json!(1u64))
        );
    }

    #[test]
    fn abort_reason_mentions_the_threshold() {
        assert_eq!(
            abort_reason(0.50),
            "Error rate exceeds 50%. Aborting sync, old data preserved."
        );
    }

    #[test]
    fn kind_counts_aggregate_for_metrics() {
        let mut collector = FileCollector::default();
        collector.record_invalid(
            RawRow::new(),
            vec![
                field_error(1, "a", ErrorKind::Type),
                field_error(1, "b", ErrorKind::Type),
                field_error(1, "c", ErrorKind::Format),
            ],
        );
        assert_eq!(collector.kind_counts.get("TYPE"), Some(&2));
        assert_eq!(collector.kind_counts.get("FORMAT"), Some(&1));
    }
}
