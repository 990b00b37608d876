//! Loans linking a member to a borrowed book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BookCode, MemberCode};

/// Opaque loan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    /// Fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a stored identifier.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One borrowing of one book by one member.
///
/// A loan is active while `returned_at` is `None`. Returning closes the loan;
/// loans are never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    id: LoanId,
    member_code: MemberCode,
    book_code: BookCode,
    borrowed_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Open a new active loan.
    #[must_use]
    pub const fn open(
        id: LoanId,
        member_code: MemberCode,
        book_code: BookCode,
        borrowed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            member_code,
            book_code,
            borrowed_at,
            returned_at: None,
        }
    }

    /// Rehydrate a loan read back from storage.
    #[must_use]
    pub const fn from_parts(
        id: LoanId,
        member_code: MemberCode,
        book_code: BookCode,
        borrowed_at: DateTime<Utc>,
        returned_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            member_code,
            book_code,
            borrowed_at,
            returned_at,
        }
    }

    /// Loan identifier.
    #[must_use]
    pub const fn id(&self) -> LoanId {
        self.id
    }

    /// Borrowing member.
    #[must_use]
    pub const fn member_code(&self) -> &MemberCode {
        &self.member_code
    }

    /// Borrowed title.
    #[must_use]
    pub const fn book_code(&self) -> &BookCode {
        &self.book_code
    }

    /// When the copy left the shelf.
    #[must_use]
    pub const fn borrowed_at(&self) -> DateTime<Utc> {
        self.borrowed_at
    }

    /// When the copy came back, if it has.
    #[must_use]
    pub const fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    /// Not yet returned.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Whether this loan pairs `member_code` with `book_code`.
    #[must_use]
    pub fn is_for(&self, member_code: &MemberCode, book_code: &BookCode) -> bool {
        &self.member_code == member_code && &self.book_code == book_code
    }

    /// Record the return.
    pub const fn close(&mut self, returned_at: DateTime<Utc>) {
        self.returned_at = Some(returned_at);
    }

    /// Whole days between borrowing and `now`, rounded down.
    ///
    /// Clock skew that puts `now` before `borrowed_at` counts as zero days.
    #[must_use]
    pub fn whole_days_elapsed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.borrowed_at).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn loan() -> Loan {
        let borrowed_at = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        Loan::open(
            LoanId::random(),
            MemberCode::new("M001").expect("member code"),
            BookCode::new("JK-45").expect("book code"),
            borrowed_at,
        )
    }

    #[rstest]
    #[case(Duration::hours(23), 0)]
    #[case(Duration::days(7) + Duration::hours(23), 7)]
    #[case(Duration::days(8), 8)]
    #[case(Duration::hours(-5), 0)]
    fn whole_days_round_down(loan: Loan, #[case] offset: Duration, #[case] expected: i64) {
        let now = loan.borrowed_at() + offset;
        assert_eq!(loan.whole_days_elapsed(now), expected);
    }

    #[rstest]
    fn closing_marks_the_loan_inactive(mut loan: Loan) {
        assert!(loan.is_active());
        let returned_at = loan.borrowed_at() + Duration::days(2);
        loan.close(returned_at);
        assert!(!loan.is_active());
        assert_eq!(loan.returned_at(), Some(returned_at));
    }
}
