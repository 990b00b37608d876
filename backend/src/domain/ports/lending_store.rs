//! Unit-of-work boundary over the catalogue, membership and loan stores.
//!
//! Every borrow, return and seed runs inside [`LendingStore::transact`]. The
//! closure receives a [`LendingUnitOfWork`] implementing all three store
//! ports; its writes are committed when it returns `Ok` and discarded when it
//! returns `Err`.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::LendingError;

use super::{CatalogStore, LoanLedger, MembershipStore, define_port_error};

define_port_error! {
    /// Errors raised by lending store adapters.
    pub enum LendingStoreError {
        /// The store could not be reached.
        Connection {
            /// Driver or pool description of the failure.
            message: String,
        } => "lending store connection failed: {message}",
        /// A query or mutation failed while executing.
        Query {
            /// Driver description of the failure.
            message: String,
        } => "lending store query failed: {message}",
        /// A guarded write matched no row, so a stored invariant would break.
        Conflict {
            /// Which write was refused.
            message: String,
        } => "lending store rejected write: {message}",
    }
}

/// Boxed future returned by unit-of-work closures.
pub type UnitOfWorkFuture<'u, T> = Pin<Box<dyn Future<Output = Result<T, LendingError>> + Send + 'u>>;

/// The three store ports bundled for use inside one transaction.
pub trait LendingUnitOfWork: CatalogStore + MembershipStore + LoanLedger {}

impl<T> LendingUnitOfWork for T where T: CatalogStore + MembershipStore + LoanLedger {}

/// Runs lending work atomically.
///
/// Adapters must isolate concurrent units of work so that two borrows of the
/// last copy cannot both observe `stock = 1`.
#[async_trait]
pub trait LendingStore: Send + Sync {
    /// Run `work` in one transaction, committing only when it returns `Ok`.
    async fn transact<T, F>(&self, work: F) -> Result<T, LendingError>
    where
        T: Send + 'static,
        F: for<'u> FnOnce(&'u mut dyn LendingUnitOfWork) -> UnitOfWorkFuture<'u, T> + Send + 'static;
}
