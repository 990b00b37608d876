//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_store;
mod lending_command;
mod lending_metrics;
mod lending_store;
mod library_query;
mod loan_ledger;
mod membership_store;

pub use catalog_store::CatalogStore;
#[cfg(test)]
pub use lending_command::MockLendingCommand;
pub use lending_command::{BorrowReceipt, LendingCommand, LendingRequest, ReturnReceipt};
pub use lending_metrics::{
    LendingMetrics, LendingMetricsError, LendingOperation, NoOpLendingMetrics,
};
pub use lending_store::{LendingStore, LendingStoreError, LendingUnitOfWork, UnitOfWorkFuture};
#[cfg(test)]
pub use library_query::MockLibraryQuery;
pub use library_query::{BookAvailability, LibraryQuery, MemberStanding};
pub use loan_ledger::LoanLedger;
pub use membership_store::MembershipStore;
