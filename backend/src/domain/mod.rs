//! Domain primitives, lending rules and services.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic error envelope.
//! - `Member`, `Book`, `Loan` and their code newtypes.
//! - `LendingPolicy`: borrowing limit and late-return penalty.
//! - `LendingService`: implements the lending driving ports.
//! - `LibrarySeeder`: bulk creation of books and members.

pub(crate) mod code;
pub mod error;
pub mod ports;
pub mod trace_id;

mod book;
mod lending_error;
mod lending_service;
mod library_seed;
mod loan;
mod member;
mod policy;

pub use self::book::{Book, BookCode, BookValidationError, MAX_TITLE_LENGTH};
pub use self::code::{CodeValidationError, MAX_CODE_LENGTH};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::lending_error::{BorrowLimit, LendingError};
pub use self::lending_service::LendingService;
pub use self::library_seed::{LibrarySeed, LibrarySeeder, SeedBook, SeedMember, SeedSummary};
pub use self::loan::{Loan, LoanId};
pub use self::member::{Member, MemberCode, PenaltyState};
pub use self::policy::{
    DEFAULT_BORROW_LIMIT, DEFAULT_LATE_AFTER_DAYS, DEFAULT_PENALTY_DAYS, LendingPolicy,
    LendingPolicyError, MAX_PENALTY_DAYS, PenaltyDuration, ReturnAssessment,
};
pub use self::trace_id::TraceId;
