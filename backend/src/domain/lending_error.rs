//! Rejections raised by the lending rules.
//!
//! Each variant is a distinct, expected outcome of a borrow or return. Store
//! failures are carried separately in [`LendingError::Store`] so callers can
//! tell a business refusal from an infrastructure fault.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::error;

use super::ports::LendingStoreError;
use super::{BookCode, Error, MemberCode};

/// Which borrowing limit a member ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowLimit {
    /// The member already holds the maximum number of active loans.
    ActiveLoans {
        /// Configured maximum.
        limit: u32,
    },
    /// The member already holds a copy of this title.
    SameTitle {
        /// Title already on loan.
        book_code: BookCode,
    },
}

impl fmt::Display for BorrowLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveLoans { limit } => {
                write!(f, "You cannot borrow more than {limit} books.")
            }
            Self::SameTitle { book_code } => {
                write!(f, "You already have book {book_code} on loan.")
            }
        }
    }
}

/// Why a borrow, return or listing did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    /// No member has this code.
    #[error("Member {member_code} not found.")]
    MemberNotFound {
        /// Requested member.
        member_code: MemberCode,
    },
    /// No book has this code.
    #[error("Book {book_code} not found.")]
    BookNotFound {
        /// Requested book.
        book_code: BookCode,
    },
    /// The member's penalty still blocks borrowing.
    #[error("Member {member_code} is penalized and cannot borrow books.")]
    MemberPenalized {
        /// Penalized member.
        member_code: MemberCode,
        /// `None` for a permanent penalty.
        penalty_until: Option<DateTime<Utc>>,
    },
    /// A borrowing limit was reached.
    #[error("{limit}")]
    BorrowLimitExceeded {
        /// Borrowing member.
        member_code: MemberCode,
        /// Limit that applied.
        limit: BorrowLimit,
    },
    /// Every copy is out.
    #[error("Book is not available.")]
    BookUnavailable {
        /// Requested book.
        book_code: BookCode,
    },
    /// The member holds no active loan of this book.
    #[error("No active loan for member {member_code} and book {book_code}.")]
    LoanNotFound {
        /// Returning member.
        member_code: MemberCode,
        /// Book being returned.
        book_code: BookCode,
    },
    /// A request field failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// Wire name of the field.
        field: String,
        /// What was wrong with it.
        message: String,
    },
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] LendingStoreError),
}

impl LendingError {
    /// Field validation failure.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable snake_case name of the rejection, used in error details and
    /// metric labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MemberNotFound { .. } => "member_not_found",
            Self::BookNotFound { .. } => "book_not_found",
            Self::MemberPenalized { .. } => "member_penalized",
            Self::BorrowLimitExceeded { .. } => "borrow_limit_exceeded",
            Self::BookUnavailable { .. } => "book_unavailable",
            Self::LoanNotFound { .. } => "loan_not_found",
            Self::Validation { .. } => "validation_error",
            Self::Store(_) => "store_error",
        }
    }

    fn details(&self) -> Value {
        let mut details = Map::new();
        details.insert("reason".to_owned(), json!(self.reason()));
        match self {
            Self::MemberNotFound { member_code } => {
                details.insert("member_id".to_owned(), json!(member_code));
            }
            Self::BookNotFound { book_code } | Self::BookUnavailable { book_code } => {
                details.insert("book_id".to_owned(), json!(book_code));
            }
            Self::MemberPenalized {
                member_code,
                penalty_until,
            } => {
                details.insert("member_id".to_owned(), json!(member_code));
                details.insert("penalty_until".to_owned(), json!(penalty_until));
            }
            Self::BorrowLimitExceeded { member_code, limit } => {
                details.insert("member_id".to_owned(), json!(member_code));
                match limit {
                    BorrowLimit::ActiveLoans { limit: max } => {
                        details.insert("limit".to_owned(), json!(max));
                    }
                    BorrowLimit::SameTitle { book_code } => {
                        details.insert("book_id".to_owned(), json!(book_code));
                    }
                }
            }
            Self::LoanNotFound {
                member_code,
                book_code,
            } => {
                details.insert("member_id".to_owned(), json!(member_code));
                details.insert("book_id".to_owned(), json!(book_code));
            }
            Self::Validation { field, .. } => {
                details.insert("field".to_owned(), json!(field));
            }
            Self::Store(_) => {}
        }
        Value::Object(details)
    }
}

/// Client-facing message for store outages. Driver text stays in the logs.
const STORE_UNAVAILABLE_MESSAGE: &str = "Lending store is unavailable.";

impl From<LendingError> for Error {
    fn from(value: LendingError) -> Self {
        match &value {
            LendingError::MemberNotFound { .. } | LendingError::BookNotFound { .. } => {
                Self::not_found(value.to_string()).with_details(value.details())
            }
            LendingError::Store(LendingStoreError::Connection { message }) => {
                error!(error = %message, "lending store connection failed");
                Self::service_unavailable(STORE_UNAVAILABLE_MESSAGE)
            }
            LendingError::Store(err) => Self::internal(err.to_string()),
            LendingError::MemberPenalized { .. }
            | LendingError::BorrowLimitExceeded { .. }
            | LendingError::BookUnavailable { .. }
            | LendingError::LoanNotFound { .. }
            | LendingError::Validation { .. } => {
                Self::invalid_request(value.to_string()).with_details(value.details())
            }
        }
    }
}
