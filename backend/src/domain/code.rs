//! Shared validation for human-assigned record codes.
//!
//! Members and books are addressed by short codes such as `M001` or `JK-45`.
//! Codes are trimmed, must be non-empty, at most [`MAX_CODE_LENGTH`]
//! characters, and may contain ASCII letters, digits, `-` and `_`.

/// Longest accepted code, in characters.
pub const MAX_CODE_LENGTH: usize = 32;

/// Why a raw string was rejected as a code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeValidationError {
    /// Nothing left after trimming.
    #[error("{kind} code must not be empty")]
    Empty {
        /// Record kind, `member` or `book`.
        kind: &'static str,
    },
    /// Longer than [`MAX_CODE_LENGTH`].
    #[error("{kind} code must be at most {max} characters")]
    TooLong {
        /// Record kind, `member` or `book`.
        kind: &'static str,
        /// Limit that was exceeded.
        max: usize,
    },
    /// Contains something other than ASCII letters, digits, `-` or `_`.
    #[error("{kind} code contains invalid character {found:?}")]
    InvalidCharacter {
        /// Record kind, `member` or `book`.
        kind: &'static str,
        /// First offending character.
        found: char,
    },
}

pub(crate) fn normalise_code(raw: &str, kind: &'static str) -> Result<String, CodeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CodeValidationError::Empty { kind });
    }
    if trimmed.chars().count() > MAX_CODE_LENGTH {
        return Err(CodeValidationError::TooLong {
            kind,
            max: MAX_CODE_LENGTH,
        });
    }
    if let Some(found) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(CodeValidationError::InvalidCharacter { kind, found });
    }
    Ok(trimmed.to_owned())
}

/// Declares a validated string newtype for a record code.
macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and normalise `raw`.
            ///
            /// # Errors
            /// Returns a [`CodeValidationError`](crate::domain::CodeValidationError)
            /// when the trimmed input is empty, too long or malformed.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, $crate::domain::code::CodeValidationError> {
                $crate::domain::code::normalise_code(raw.as_ref(), $kind).map(Self)
            }

            /// Borrow the normalised code.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::code::CodeValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::code::CodeValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use define_code;
