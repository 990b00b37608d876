//! Bulk creation of books and members from a seed document.
//!
//! Seeding is additive. Records whose code already exists are counted as
//! skipped and left untouched, so the same seed can be applied repeatedly.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::ports::{LendingStore, LendingUnitOfWork, UnitOfWorkFuture};
use crate::domain::{Book, BookCode, LendingError, Member, MemberCode};

/// Seed document, usually read from JSON.
///
/// ```json
/// { "books": [{ "code": "JK-45", "title": "Harry Potter", "stock": 1 }],
///   "members": [{ "code": "M001" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibrarySeed {
    /// Catalogue entries to add.
    #[serde(default)]
    pub books: Vec<SeedBook>,
    /// Members to register.
    #[serde(default)]
    pub members: Vec<SeedMember>,
}

/// Raw catalogue entry, validated by [`LibrarySeed::into_records`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedBook {
    /// Book code such as `JK-45`.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Copies placed on the shelf.
    pub stock: u32,
}

/// Raw member entry. Seeded members start with no penalty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedMember {
    /// Member code such as `M001`.
    pub code: String,
}

/// Counts reported after a seed is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Books that did not exist before.
    pub books_inserted: usize,
    /// Books whose code was already taken.
    pub books_skipped: usize,
    /// Members that did not exist before.
    pub members_inserted: usize,
    /// Members whose code was already taken.
    pub members_skipped: usize,
}

impl LibrarySeed {
    /// Parse every entry into domain records, failing on the first bad one.
    ///
    /// # Errors
    /// [`LendingError::Validation`] naming the offending entry, for example
    /// `books[1].title`.
    pub fn into_records(self) -> Result<(Vec<Book>, Vec<Member>), LendingError> {
        let books = self
            .books
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let code = BookCode::new(&entry.code)
                    .map_err(|err| LendingError::validation(format!("books[{index}].code"), err.to_string()))?;
                Book::new(code, entry.title, entry.stock)
                    .map_err(|err| LendingError::validation(format!("books[{index}].title"), err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let members = self
            .members
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                MemberCode::new(&entry.code)
                    .map(Member::clear)
                    .map_err(|err| LendingError::validation(format!("members[{index}].code"), err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((books, members))
    }
}

/// Applies [`LibrarySeed`] documents in a single unit of work.
pub struct LibrarySeeder<S> {
    store: Arc<S>,
}

impl<S> LibrarySeeder<S>
where
    S: LendingStore,
{
    /// Seeder writing through `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Insert every new record from `seed` and count the rest as skipped.
    ///
    /// # Errors
    /// Validation failures from [`LibrarySeed::into_records`] and store
    /// failures. Nothing is written when either occurs.
    pub async fn apply(&self, seed: LibrarySeed) -> Result<SeedSummary, LendingError> {
        let (books, members) = seed.into_records()?;
        let summary = self
            .store
            .transact(move |uow| insert_within(uow, books, members))
            .await?;
        info!(
            books_inserted = summary.books_inserted,
            books_skipped = summary.books_skipped,
            members_inserted = summary.members_inserted,
            members_skipped = summary.members_skipped,
            "library seed applied"
        );
        Ok(summary)
    }
}

fn insert_within(
    uow: &mut dyn LendingUnitOfWork,
    books: Vec<Book>,
    members: Vec<Member>,
) -> UnitOfWorkFuture<'_, SeedSummary> {
    Box::pin(async move {
        let mut summary = SeedSummary::default();
        for book in &books {
            if uow.insert_book(book).await? {
                summary.books_inserted += 1;
            } else {
                summary.books_skipped += 1;
            }
        }
        for member in &members {
            if uow.insert_member(member).await? {
                summary.members_inserted += 1;
            } else {
                summary.members_skipped += 1;
            }
        }
        Ok(summary)
    })
}
