//! Process-local lending store.
//!
//! Used when no database is configured and throughout the test suite. Units
//! of work are serialised behind an async mutex. Each unit runs against a copy
//! of the state which replaces the shared state only when the unit succeeds,
//! so a rejected borrow or return leaves nothing behind.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    CatalogStore, LendingStore, LendingStoreError, LendingUnitOfWork, LoanLedger,
    MembershipStore, UnitOfWorkFuture,
};
use crate::domain::{
    Book, BookCode, LendingError, Loan, LoanId, Member, MemberCode, PenaltyState,
};

#[derive(Debug, Clone, Default)]
struct LibraryState {
    books: BTreeMap<BookCode, Book>,
    members: BTreeMap<MemberCode, Member>,
    loans: Vec<Loan>,
}

/// In-memory [`LendingStore`].
///
/// # Examples
/// ```
/// use library_backend::domain::{Book, BookCode, Member, MemberCode};
/// use library_backend::outbound::memory::InMemoryLendingStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryLendingStore::with_records(
///     [Book::new(BookCode::new("JK-45")?, "Harry Potter", 1)?],
///     [Member::clear(MemberCode::new("M001")?)],
/// );
/// # drop(store);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLendingStore {
    state: Mutex<LibraryState>,
}

impl InMemoryLendingStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with books and members and no loans.
    #[must_use]
    pub fn with_records(
        books: impl IntoIterator<Item = Book>,
        members: impl IntoIterator<Item = Member>,
    ) -> Self {
        let state = LibraryState {
            books: books
                .into_iter()
                .map(|book| (book.code().clone(), book))
                .collect(),
            members: members
                .into_iter()
                .map(|member| (member.code().clone(), member))
                .collect(),
            loans: Vec::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Every loan ever opened, active or closed, in creation order.
    pub async fn loans(&self) -> Vec<Loan> {
        self.state.lock().await.loans.clone()
    }
}

#[async_trait]
impl LendingStore for InMemoryLendingStore {
    async fn transact<T, F>(&self, work: F) -> Result<T, LendingError>
    where
        T: Send + 'static,
        F: for<'u> FnOnce(&'u mut dyn LendingUnitOfWork) -> UnitOfWorkFuture<'u, T> + Send + 'static,
    {
        let mut shared = self.state.lock().await;
        let mut unit = MemoryUnitOfWork {
            state: shared.clone(),
        };
        let unit_of_work: &mut dyn LendingUnitOfWork = &mut unit;
        let value = work(unit_of_work).await?;
        *shared = unit.state;
        Ok(value)
    }
}

struct MemoryUnitOfWork {
    state: LibraryState,
}

impl MemoryUnitOfWork {
    fn book_mut(&mut self, code: &BookCode) -> Result<&mut Book, LendingStoreError> {
        self.state
            .books
            .get_mut(code)
            .ok_or_else(|| LendingStoreError::conflict(format!("book {code} does not exist")))
    }
}

#[async_trait]
impl CatalogStore for MemoryUnitOfWork {
    async fn find_book(&mut self, code: &BookCode) -> Result<Option<Book>, LendingStoreError> {
        Ok(self.state.books.get(code).cloned())
    }

    async fn list_books(&mut self) -> Result<Vec<Book>, LendingStoreError> {
        Ok(self.state.books.values().cloned().collect())
    }

    async fn insert_book(&mut self, book: &Book) -> Result<bool, LendingStoreError> {
        if self.state.books.contains_key(book.code()) {
            return Ok(false);
        }
        self.state.books.insert(book.code().clone(), book.clone());
        Ok(true)
    }

    async fn decrement_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError> {
        self.book_mut(code)?
            .take_copy()
            .ok_or_else(|| LendingStoreError::conflict(format!("book {code} has no stock left")))
    }

    async fn increment_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError> {
        Ok(self.book_mut(code)?.put_back_copy())
    }
}

#[async_trait]
impl MembershipStore for MemoryUnitOfWork {
    async fn find_member(
        &mut self,
        code: &MemberCode,
    ) -> Result<Option<Member>, LendingStoreError> {
        Ok(self.state.members.get(code).cloned())
    }

    async fn list_members(&mut self) -> Result<Vec<Member>, LendingStoreError> {
        Ok(self.state.members.values().cloned().collect())
    }

    async fn insert_member(&mut self, member: &Member) -> Result<bool, LendingStoreError> {
        if self.state.members.contains_key(member.code()) {
            return Ok(false);
        }
        self.state
            .members
            .insert(member.code().clone(), member.clone());
        Ok(true)
    }

    async fn update_penalty(
        &mut self,
        code: &MemberCode,
        penalty: PenaltyState,
    ) -> Result<(), LendingStoreError> {
        let member = self
            .state
            .members
            .get_mut(code)
            .ok_or_else(|| LendingStoreError::conflict(format!("member {code} does not exist")))?;
        member.set_penalty(penalty);
        Ok(())
    }
}

#[async_trait]
impl LoanLedger for MemoryUnitOfWork {
    async fn count_active_loans(&mut self, member: &MemberCode) -> Result<u32, LendingStoreError> {
        let count = self
            .state
            .loans
            .iter()
            .filter(|loan| loan.is_active() && loan.member_code() == member)
            .count();
        u32::try_from(count).map_err(|err| LendingStoreError::query(err.to_string()))
    }

    async fn find_active_loan(
        &mut self,
        member: &MemberCode,
        book: &BookCode,
    ) -> Result<Option<Loan>, LendingStoreError> {
        Ok(self
            .state
            .loans
            .iter()
            .find(|loan| loan.is_active() && loan.is_for(member, book))
            .cloned())
    }

    async fn open_loan(&mut self, loan: &Loan) -> Result<(), LendingStoreError> {
        let duplicate = self
            .state
            .loans
            .iter()
            .any(|existing| existing.is_active() && existing.is_for(loan.member_code(), loan.book_code()));
        if duplicate {
            return Err(LendingStoreError::conflict(format!(
                "member {} already has book {} on loan",
                loan.member_code(),
                loan.book_code()
            )));
        }
        self.state.loans.push(loan.clone());
        Ok(())
    }

    async fn close_loan(
        &mut self,
        id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<(), LendingStoreError> {
        let loan = self
            .state
            .loans
            .iter_mut()
            .find(|loan| loan.id() == id && loan.is_active())
            .ok_or_else(|| LendingStoreError::conflict(format!("loan {id} is not active")))?;
        loan.close(returned_at);
        Ok(())
    }

    async fn active_loan_counts(&mut self) -> Result<HashMap<MemberCode, u32>, LendingStoreError> {
        let mut counts = HashMap::new();
        for loan in self.state.loans.iter().filter(|loan| loan.is_active()) {
            *counts.entry(loan.member_code().clone()).or_insert(0_u32) += 1;
        }
        Ok(counts)
    }
}
