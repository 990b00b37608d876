//! Prometheus adapters for the domain's metrics ports.
//!
//! Compiled only with the `metrics` feature.

mod prometheus_lending;

pub use prometheus_lending::PrometheusLendingMetrics;
