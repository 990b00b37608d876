//! Driving port for borrowing and returning books.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BookCode, LendingError, LoanId, MemberCode, PenaltyState};

/// Member and book a borrow or return applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingRequest {
    /// Member borrowing or returning.
    pub member_code: MemberCode,
    /// Book being borrowed or returned.
    pub book_code: BookCode,
}

impl LendingRequest {
    /// Pair a member with a book.
    #[must_use]
    pub const fn new(member_code: MemberCode, book_code: BookCode) -> Self {
        Self {
            member_code,
            book_code,
        }
    }
}

/// Result of a successful borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowReceipt {
    /// Newly opened loan.
    pub loan_id: LoanId,
    /// Borrowing member.
    pub member_code: MemberCode,
    /// Borrowed book.
    pub book_code: BookCode,
    /// Service clock at the time of the borrow.
    pub borrowed_at: DateTime<Utc>,
    /// Copies left on the shelf after this borrow.
    pub remaining_stock: u32,
}

/// Result of a successful return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// Loan that was closed.
    pub loan_id: LoanId,
    /// Returning member.
    pub member_code: MemberCode,
    /// Returned book.
    pub book_code: BookCode,
    /// When the loan was opened.
    pub borrowed_at: DateTime<Utc>,
    /// Service clock at the time of the return.
    pub returned_at: DateTime<Utc>,
    /// Whole days the book was out, rounded down.
    pub days_elapsed: i64,
    /// Penalty recorded because the return was late.
    pub penalty: Option<PenaltyState>,
    /// Copies on the shelf after this return.
    pub stock: u32,
}

/// Borrow and return operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingCommand: Send + Sync {
    /// Lend one copy of the book to the member.
    async fn borrow_book(&self, request: LendingRequest) -> Result<BorrowReceipt, LendingError>;

    /// Close the member's active loan of the book, penalizing late returns.
    async fn return_book(&self, request: LendingRequest) -> Result<ReturnReceipt, LendingError>;
}
