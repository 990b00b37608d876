//! Catalogue entries.

use super::code::define_code;

define_code!(
    /// Public book identifier such as `JK-45`.
    BookCode,
    "book"
);

/// Longest accepted title, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Why a catalogue entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Nothing left after trimming.
    #[error("book title must not be empty")]
    EmptyTitle,
    /// Longer than [`MAX_TITLE_LENGTH`].
    #[error("book title must be at most {max} characters")]
    TitleTooLong {
        /// Limit that was exceeded.
        max: usize,
    },
}

/// A title and the number of copies currently on the shelf.
///
/// `stock` counts copies available to lend. Borrowing takes one off the shelf
/// and returning puts it back, so active loans are never subtracted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    code: BookCode,
    title: String,
    stock: u32,
}

impl Book {
    /// Build a catalogue entry with a trimmed title.
    ///
    /// # Errors
    /// Returns [`BookValidationError`] for blank or over-long titles.
    pub fn new(
        code: BookCode,
        title: impl Into<String>,
        stock: u32,
    ) -> Result<Self, BookValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(BookValidationError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }
        Ok(Self {
            code,
            title: trimmed,
            stock,
        })
    }

    /// Public identifier.
    #[must_use]
    pub const fn code(&self) -> &BookCode {
        &self.code
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Copies on the shelf.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.stock
    }

    /// Whether at least one copy can be lent.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Take one copy off the shelf. Returns `None` when none are left.
    pub fn take_copy(&mut self) -> Option<u32> {
        self.stock = self.stock.checked_sub(1)?;
        Some(self.stock)
    }

    /// Put one copy back on the shelf.
    pub fn put_back_copy(&mut self) -> u32 {
        self.stock = self.stock.saturating_add(1);
        self.stock
    }
}
