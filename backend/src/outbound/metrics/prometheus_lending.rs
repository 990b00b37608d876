//! Prometheus adapter for lending outcome metrics.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{LendingMetrics, LendingMetricsError, LendingOperation};

/// Prometheus-backed lending metrics recorder.
///
/// # Metric Specification
///
/// - **Name**: `library_lending_operations_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `operation`: `borrow` or `return`
///   - `outcome`: `success` or a rejection reason such as `book_unavailable`
pub struct PrometheusLendingMetrics {
    operations_total: IntCounterVec,
}

impl PrometheusLendingMetrics {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let operations_total = IntCounterVec::new(
            Opts::new(
                "library_lending_operations_total",
                "Borrow and return operations by outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;
        Ok(Self { operations_total })
    }
}

#[async_trait]
impl LendingMetrics for PrometheusLendingMetrics {
    async fn record_outcome(
        &self,
        operation: LendingOperation,
        outcome: &'static str,
    ) -> Result<(), LendingMetricsError> {
        self.operations_total
            .get_metric_with_label_values(&[operation.as_label(), outcome])
            .map_err(|err| LendingMetricsError::export(err.to_string()))?
            .inc();
        Ok(())
    }
}
