//! Driving port for read-only library projections.

use async_trait::async_trait;

use crate::domain::{BookCode, LendingError, MemberCode, PenaltyState};

/// A book and how many copies can be borrowed right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAvailability {
    /// Public identifier.
    pub code: BookCode,
    /// Display title.
    pub title: String,
    /// Copies on the shelf.
    pub available_stock: u32,
}

/// A member with their active loan count and penalty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStanding {
    /// Public identifier.
    pub code: MemberCode,
    /// Loans not yet returned.
    pub active_loan_count: u32,
    /// Stored penalty, whether or not it has expired.
    pub penalty: PenaltyState,
}

/// Read-only listings for the library dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryQuery: Send + Sync {
    /// Every book ordered by code.
    async fn list_books(&self) -> Result<Vec<BookAvailability>, LendingError>;

    /// Every member ordered by code.
    async fn list_members(&self) -> Result<Vec<MemberStanding>, LendingError>;
}
