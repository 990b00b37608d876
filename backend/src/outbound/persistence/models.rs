//! Internal Diesel row structs.
//!
//! These never leave the persistence layer. Conversions into domain types
//! validate stored values, so a corrupt row surfaces as a query error rather
//! than an invalid domain object.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::LendingStoreError;
use crate::domain::{Book, BookCode, Loan, LoanId, Member, MemberCode, PenaltyState};

use super::schema::{books, loans, members};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub code: String,
    pub is_penalized: bool,
    pub penalty_until: Option<DateTime<Utc>>,
}

impl TryFrom<MemberRow> for Member {
    type Error = LendingStoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let code = MemberCode::new(&row.code)
            .map_err(|err| LendingStoreError::query(format!("stored member code: {err}")))?;
        Ok(Self::new(
            code,
            PenaltyState::from_columns(row.is_penalized, row.penalty_until),
        ))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub(crate) struct NewMemberRow<'a> {
    pub code: &'a str,
    pub is_penalized: bool,
    pub penalty_until: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Member> for NewMemberRow<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            code: member.code().as_str(),
            is_penalized: member.penalty().is_penalized(),
            penalty_until: member.penalty().until(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub code: String,
    pub title: String,
    pub stock: i32,
}

impl TryFrom<BookRow> for Book {
    type Error = LendingStoreError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let code = BookCode::new(&row.code)
            .map_err(|err| LendingStoreError::query(format!("stored book code: {err}")))?;
        let stock = stock_from_column(row.stock)?;
        Self::new(code, row.title, stock)
            .map_err(|err| LendingStoreError::query(format!("stored book: {err}")))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub code: &'a str,
    pub title: &'a str,
    pub stock: i32,
}

impl<'a> TryFrom<&'a Book> for NewBookRow<'a> {
    type Error = LendingStoreError;

    fn try_from(book: &'a Book) -> Result<Self, Self::Error> {
        let stock = i32::try_from(book.stock())
            .map_err(|_| LendingStoreError::query("book stock exceeds column range"))?;
        Ok(Self {
            code: book.code().as_str(),
            title: book.title(),
            stock,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loans)]
pub(crate) struct NewLoanRow {
    pub id: Uuid,
    pub member_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
}

/// An active loan joined with its member and book codes.
pub(crate) type LoanWithCodes = (Uuid, String, String, DateTime<Utc>, Option<DateTime<Utc>>);

pub(crate) fn loan_from_columns(row: LoanWithCodes) -> Result<Loan, LendingStoreError> {
    let (id, raw_member_code, raw_book_code, borrowed_at, returned_at) = row;
    let member_code = MemberCode::new(&raw_member_code)
        .map_err(|err| LendingStoreError::query(format!("stored member code: {err}")))?;
    let book_code = BookCode::new(&raw_book_code)
        .map_err(|err| LendingStoreError::query(format!("stored book code: {err}")))?;
    Ok(Loan::from_parts(
        LoanId::from_uuid(id),
        member_code,
        book_code,
        borrowed_at,
        returned_at,
    ))
}

pub(crate) fn stock_from_column(stock: i32) -> Result<u32, LendingStoreError> {
    u32::try_from(stock).map_err(|_| LendingStoreError::query(format!("negative stock {stock}")))
}

pub(crate) fn count_from_column(count: i64) -> Result<u32, LendingStoreError> {
    u32::try_from(count).map_err(|_| LendingStoreError::query(format!("loan count {count} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn member_rows_rebuild_penalty_state() {
        let row = MemberRow {
            code: "M001".to_owned(),
            is_penalized: true,
            penalty_until: None,
        };
        let member = Member::try_from(row).expect("valid row");
        assert_eq!(member.penalty(), PenaltyState::Permanent);
    }

    #[rstest]
    fn negative_stock_is_a_query_error() {
        let row = BookRow {
            code: "JK-45".to_owned(),
            title: "Harry Potter".to_owned(),
            stock: -1,
        };
        assert!(matches!(
            Book::try_from(row),
            Err(LendingStoreError::Query { .. })
        ));
    }

    #[rstest]
    fn corrupt_codes_are_query_errors() {
        let row = MemberRow {
            code: "M 001".to_owned(),
            is_penalized: false,
            penalty_until: None,
        };
        assert!(Member::try_from(row).is_err());
    }
}
