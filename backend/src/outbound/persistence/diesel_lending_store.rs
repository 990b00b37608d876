//! PostgreSQL-backed lending store.
//!
//! Each unit of work runs in one database transaction. `find_member` and
//! `find_book` take `FOR UPDATE` row locks; the lending service always locks
//! the member before the book, so concurrent borrows and returns queue on the
//! same rows instead of deadlocking. Stock decrements are additionally guarded
//! by `stock > 0` and the table's `CHECK (stock >= 0)`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{
    CatalogStore, LendingStore, LendingStoreError, LendingUnitOfWork, LoanLedger,
    MembershipStore, UnitOfWorkFuture,
};
use crate::domain::{
    Book, BookCode, LendingError, Loan, LoanId, Member, MemberCode, PenaltyState,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    BookRow, LoanWithCodes, MemberRow, NewBookRow, NewLoanRow, NewMemberRow, count_from_column,
    loan_from_columns, stock_from_column,
};
use super::pool::DbPool;
use super::schema::{books, loans, members};

/// Diesel implementation of [`LendingStore`].
///
/// # Examples
///
/// ```rust,no_run
/// use library_backend::outbound::persistence::{DbPool, DieselLendingStore, PoolConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::new(PoolConfig::new("postgres://localhost/library")).await?;
/// let store = DieselLendingStore::new(pool);
/// # drop(store);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DieselLendingStore {
    pool: DbPool,
}

impl DieselLendingStore {
    /// Store running its units of work on connections from `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Why a transaction ended without committing.
enum TransactionError {
    Diesel(diesel::result::Error),
    Aborted(LendingError),
}

impl From<diesel::result::Error> for TransactionError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<TransactionError> for LendingError {
    fn from(error: TransactionError) -> Self {
        match error {
            TransactionError::Diesel(source) => Self::Store(map_diesel_error(source)),
            TransactionError::Aborted(rejection) => rejection,
        }
    }
}

#[async_trait]
impl LendingStore for DieselLendingStore {
    async fn transact<T, F>(&self, work: F) -> Result<T, LendingError>
    where
        T: Send + 'static,
        F: for<'u> FnOnce(&'u mut dyn LendingUnitOfWork) -> UnitOfWorkFuture<'u, T> + Send + 'static,
    {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| LendingError::Store(map_pool_error(error)))?;

        let value = conn
            .transaction(|tx_conn| {
                async move {
                    let mut unit = DieselUnitOfWork { conn: tx_conn };
                    let unit_of_work: &mut dyn LendingUnitOfWork = &mut unit;
                    work(unit_of_work).await.map_err(TransactionError::Aborted)
                }
                .scope_boxed()
            })
            .await
            .map_err(LendingError::from)?;
        Ok(value)
    }
}

struct DieselUnitOfWork<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl DieselUnitOfWork<'_> {
    async fn member_id(&mut self, code: &MemberCode) -> Result<i64, LendingStoreError> {
        members::table
            .filter(members::code.eq(code.as_str()))
            .select(members::id)
            .first::<i64>(self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn book_id(&mut self, code: &BookCode) -> Result<i64, LendingStoreError> {
        books::table
            .filter(books::code.eq(code.as_str()))
            .select(books::id)
            .first::<i64>(self.conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl<'c> CatalogStore for DieselUnitOfWork<'c> {
    async fn find_book(&mut self, code: &BookCode) -> Result<Option<Book>, LendingStoreError> {
        books::table
            .filter(books::code.eq(code.as_str()))
            .select(BookRow::as_select())
            .for_update()
            .first::<BookRow>(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Book::try_from)
            .transpose()
    }

    async fn list_books(&mut self) -> Result<Vec<Book>, LendingStoreError> {
        books::table
            .order(books::code.asc())
            .select(BookRow::as_select())
            .load::<BookRow>(self.conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Book::try_from)
            .collect()
    }

    async fn insert_book(&mut self, book: &Book) -> Result<bool, LendingStoreError> {
        let row = NewBookRow::try_from(book)?;
        let inserted = diesel::insert_into(books::table)
            .values(&row)
            .on_conflict(books::code)
            .do_nothing()
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn decrement_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError> {
        let stock = diesel::update(
            books::table
                .filter(books::code.eq(code.as_str()))
                .filter(books::stock.gt(0)),
        )
        .set(books::stock.eq(books::stock - 1))
        .returning(books::stock)
        .get_result::<i32>(self.conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| LendingStoreError::conflict(format!("book {code} has no stock left")))?;
        stock_from_column(stock)
    }

    async fn increment_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError> {
        let stock = diesel::update(books::table.filter(books::code.eq(code.as_str())))
            .set(books::stock.eq(books::stock + 1))
            .returning(books::stock)
            .get_result::<i32>(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| LendingStoreError::conflict(format!("book {code} does not exist")))?;
        stock_from_column(stock)
    }
}

#[async_trait]
impl<'c> MembershipStore for DieselUnitOfWork<'c> {
    async fn find_member(
        &mut self,
        code: &MemberCode,
    ) -> Result<Option<Member>, LendingStoreError> {
        members::table
            .filter(members::code.eq(code.as_str()))
            .select(MemberRow::as_select())
            .for_update()
            .first::<MemberRow>(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Member::try_from)
            .transpose()
    }

    async fn list_members(&mut self) -> Result<Vec<Member>, LendingStoreError> {
        members::table
            .order(members::code.asc())
            .select(MemberRow::as_select())
            .load::<MemberRow>(self.conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Member::try_from)
            .collect()
    }

    async fn insert_member(&mut self, member: &Member) -> Result<bool, LendingStoreError> {
        let inserted = diesel::insert_into(members::table)
            .values(NewMemberRow::from(member))
            .on_conflict(members::code)
            .do_nothing()
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn update_penalty(
        &mut self,
        code: &MemberCode,
        penalty: PenaltyState,
    ) -> Result<(), LendingStoreError> {
        let updated = diesel::update(members::table.filter(members::code.eq(code.as_str())))
            .set((
                members::is_penalized.eq(penalty.is_penalized()),
                members::penalty_until.eq(penalty.until()),
            ))
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(LendingStoreError::conflict(format!(
                "member {code} does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<'c> LoanLedger for DieselUnitOfWork<'c> {
    async fn count_active_loans(&mut self, member: &MemberCode) -> Result<u32, LendingStoreError> {
        let count = loans::table
            .inner_join(members::table)
            .filter(members::code.eq(member.as_str()))
            .filter(loans::returned_at.is_null())
            .count()
            .get_result::<i64>(self.conn)
            .await
            .map_err(map_diesel_error)?;
        count_from_column(count)
    }

    async fn find_active_loan(
        &mut self,
        member: &MemberCode,
        book: &BookCode,
    ) -> Result<Option<Loan>, LendingStoreError> {
        loans::table
            .inner_join(members::table)
            .inner_join(books::table)
            .filter(members::code.eq(member.as_str()))
            .filter(books::code.eq(book.as_str()))
            .filter(loans::returned_at.is_null())
            .select((
                loans::id,
                members::code,
                books::code,
                loans::borrowed_at,
                loans::returned_at,
            ))
            .first::<LoanWithCodes>(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(loan_from_columns)
            .transpose()
    }

    async fn open_loan(&mut self, loan: &Loan) -> Result<(), LendingStoreError> {
        let member_id = self.member_id(loan.member_code()).await?;
        let book_id = self.book_id(loan.book_code()).await?;
        diesel::insert_into(loans::table)
            .values(NewLoanRow {
                id: *loan.id().as_uuid(),
                member_id,
                book_id,
                borrowed_at: loan.borrowed_at(),
            })
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn close_loan(
        &mut self,
        id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<(), LendingStoreError> {
        let closed = diesel::update(
            loans::table
                .filter(loans::id.eq(*id.as_uuid()))
                .filter(loans::returned_at.is_null()),
        )
        .set(loans::returned_at.eq(Some(returned_at)))
        .execute(self.conn)
        .await
        .map_err(map_diesel_error)?;
        if closed == 0 {
            return Err(LendingStoreError::conflict(format!(
                "loan {id} is not active"
            )));
        }
        Ok(())
    }

    async fn active_loan_counts(&mut self) -> Result<HashMap<MemberCode, u32>, LendingStoreError> {
        let rows = loans::table
            .inner_join(members::table)
            .filter(loans::returned_at.is_null())
            .group_by(members::code)
            .select((members::code, diesel::dsl::count_star()))
            .load::<(String, i64)>(self.conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(raw_code, count)| {
                let code = MemberCode::new(&raw_code).map_err(|err| {
                    LendingStoreError::query(format!("stored member code: {err}"))
                })?;
                Ok((code, count_from_column(count)?))
            })
            .collect()
    }
}
