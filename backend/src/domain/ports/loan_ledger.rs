//! Port for loan records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BookCode, Loan, LoanId, MemberCode};

use super::LendingStoreError;

/// Loan bookkeeping inside a unit of work.
#[async_trait]
pub trait LoanLedger: Send {
    /// Loans the member has not returned yet.
    async fn count_active_loans(&mut self, member: &MemberCode) -> Result<u32, LendingStoreError>;

    /// The active loan for exactly this member and book, if any.
    async fn find_active_loan(
        &mut self,
        member: &MemberCode,
        book: &BookCode,
    ) -> Result<Option<Loan>, LendingStoreError>;

    /// Record a new active loan.
    async fn open_loan(&mut self, loan: &Loan) -> Result<(), LendingStoreError>;

    /// Set `returned_at` on an active loan. Loans are never deleted.
    async fn close_loan(
        &mut self,
        id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<(), LendingStoreError>;

    /// Active loan counts keyed by member. Members without loans are absent.
    async fn active_loan_counts(&mut self) -> Result<HashMap<MemberCode, u32>, LendingStoreError>;
}
