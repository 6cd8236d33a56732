use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use findata_core::AdapterError;

/// The four instruments every terminal sync publishes.
pub struct SyncMetrics {
    registry: Registry,
    pub sync_operations_total: IntCounterVec,
    pub sync_duration_seconds: HistogramVec,
    pub validation_errors_total: IntCounterVec,
    pub rows_inserted_total: IntCounterVec,
}

impl SyncMetrics {
    pub fn new() -> Result<Self, AdapterError> {
        let registry = Registry::new();

        let sync_operations_total = IntCounterVec::new(
            Opts::new("sync_operations_total", "Total number of sync operations"),
            &["tenant", "loan_type", "status"],
        )
        .map_err(metric_err)?;

        let sync_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "sync_duration_seconds",
                "Duration of sync operations in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
            &["tenant", "loan_type"],
        )
        .map_err(metric_err)?;

        let validation_errors_total = IntCounterVec::new(
            Opts::new(
                "validation_errors_total",
                "Total number of validation errors",
            ),
            &["tenant", "error_type"],
        )
        .map_err(metric_err)?;

        let rows_inserted_total = IntCounterVec::new(
            Opts::new(
                "rows_inserted_total",
                "Total rows inserted into the warehouse",
            ),
            &["tenant", "table"],
        )
        .map_err(metric_err)?;

        registry
            .register(Box::new(sync_operations_total.clone()))
            .map_err(metric_err)?;
        registry
            .register(Box::new(sync_duration_seconds.clone()))
            .map_err(metric_err)?;
        registry
            .register(Box::new(validation_errors_total.clone()))
            .map_err(metric_err)?;
        registry
            .register(Box::new(rows_inserted_total.clone()))
            .map_err(metric_err)?;

        Ok(Self {
            registry,
            sync_operations_total,
            sync_duration_seconds,
            validation_errors_total,
            rows_inserted_total,
        })
    }

    /// Registry for exposition by whatever sink the process wires up.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn metric_err(e: prometheus::Error) -> AdapterError {
    AdapterError::Other(format!("metric registration failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_instruments_register() {
        let metrics = SyncMetrics::new().unwrap();
        metrics
            .sync_operations_total
            .with_label_values(&["BANK001", "RETAIL", "COMPLETED"])
            .inc();
        metrics
            .validation_errors_total
            .with_label_values(&["BANK001", "VALUE"])
            .inc_by(3);
        assert_eq!(
            metrics
                .sync_operations_total
                .with_label_values(&["BANK001", "RETAIL", "COMPLETED"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .validation_errors_total
                .with_label_values(&["BANK001", "VALUE"])
                .get(),
            3
        );
        // Two independent engines must not collide on registration.
        assert!(SyncMetrics::new().is_ok());
    }
}
