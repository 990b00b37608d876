//! Port for recording borrow and return outcomes.
//!
//! The lending service reports every completed operation here. A failing
//! recorder is logged and otherwise ignored; metrics never change the result
//! returned to the caller.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording lending metrics.
    pub enum LendingMetricsError {
        /// Metric exporter rejected the write.
        Export {
            /// Exporter description of the failure.
            message: String,
        } => "lending metrics exporter failed: {message}",
    }
}

/// Which lending operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LendingOperation {
    /// `POST /api/books/borrow`.
    Borrow,
    /// `POST /api/books/return`.
    Return,
}

impl LendingOperation {
    /// Metric label value.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
        }
    }
}

/// Records lending outcomes.
///
/// `outcome` is `"success"` or the snake_case rejection reason, for example
/// `"book_unavailable"` or `"store_error"`.
#[async_trait]
pub trait LendingMetrics: Send + Sync {
    /// Count one finished `operation` under `outcome`.
    async fn record_outcome(
        &self,
        operation: LendingOperation,
        outcome: &'static str,
    ) -> Result<(), LendingMetricsError>;
}

/// Discards every outcome. Used when the `metrics` feature is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLendingMetrics;

#[async_trait]
impl LendingMetrics for NoOpLendingMetrics {
    async fn record_outcome(
        &self,
        _operation: LendingOperation,
        _outcome: &'static str,
    ) -> Result<(), LendingMetricsError> {
        Ok(())
    }
}
