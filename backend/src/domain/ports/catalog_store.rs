//! Port for book records.

use async_trait::async_trait;

use crate::domain::{Book, BookCode};

use super::LendingStoreError;

/// Book lookups and stock movements inside a unit of work.
///
/// Implementations hold no business rules. `find_book` locks the row for the
/// rest of the unit of work where the backing store supports it.
#[async_trait]
pub trait CatalogStore: Send {
    /// Fetch a book by code.
    async fn find_book(&mut self, code: &BookCode) -> Result<Option<Book>, LendingStoreError>;

    /// All books ordered by code.
    async fn list_books(&mut self) -> Result<Vec<Book>, LendingStoreError>;

    /// Insert `book` unless its code already exists. Returns whether a row was
    /// written.
    async fn insert_book(&mut self, book: &Book) -> Result<bool, LendingStoreError>;

    /// Take one copy off the shelf and return the remaining stock.
    ///
    /// Fails with [`LendingStoreError::Conflict`] when the book is missing or
    /// its stock is already zero.
    async fn decrement_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError>;

    /// Put one copy back and return the new stock.
    async fn increment_stock(&mut self, code: &BookCode) -> Result<u32, LendingStoreError>;
}
