//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL lending store over Diesel.
//! - **memory**: in-process lending store for database-less runs and tests.
//! - **metrics**: Prometheus lending counters (feature `metrics`).
//!
//! Adapters translate between domain types and infrastructure types and
//! hold no lending rules.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
