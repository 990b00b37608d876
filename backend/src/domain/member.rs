//! Library members and their penalty standing.

use chrono::{DateTime, Utc};

use super::code::define_code;

define_code!(
    /// Public, human-assigned member identifier such as `M001`.
    MemberCode,
    "member"
);

/// Whether a member is barred from borrowing.
///
/// Stores persist this as an `is_penalized` flag plus a nullable
/// `penalty_until` timestamp. [`PenaltyState::from_columns`] and
/// [`PenaltyState::is_penalized`]/[`PenaltyState::until`] convert between the
/// two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenaltyState {
    /// Free to borrow.
    #[default]
    Clear,
    /// Penalised until the given instant (exclusive).
    Until(DateTime<Utc>),
    /// Penalised with no expiry. Only cleared outside this service.
    Permanent,
}

impl PenaltyState {
    /// Rebuild the state from its stored columns.
    ///
    /// An expiry recorded without the flag is ignored.
    #[must_use]
    pub const fn from_columns(is_penalized: bool, penalty_until: Option<DateTime<Utc>>) -> Self {
        match (is_penalized, penalty_until) {
            (false, _) => Self::Clear,
            (true, Some(until)) => Self::Until(until),
            (true, None) => Self::Permanent,
        }
    }

    /// Stored `is_penalized` flag.
    #[must_use]
    pub const fn is_penalized(self) -> bool {
        !matches!(self, Self::Clear)
    }

    /// Stored `penalty_until` column; only expiring penalties have one.
    #[must_use]
    pub const fn until(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Until(until) => Some(until),
            Self::Clear | Self::Permanent => None,
        }
    }

    /// True when the penalty still blocks borrowing at `now`.
    ///
    /// An expiring penalty stops blocking once `now` reaches `penalty_until`.
    #[must_use]
    pub fn blocks_borrowing_at(self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Clear => false,
            Self::Until(until) => now < until,
            Self::Permanent => true,
        }
    }
}

/// A library member as seen by the lending rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    code: MemberCode,
    penalty: PenaltyState,
}

impl Member {
    /// Member with the given standing.
    #[must_use]
    pub const fn new(code: MemberCode, penalty: PenaltyState) -> Self {
        Self { code, penalty }
    }

    /// A member in good standing.
    #[must_use]
    pub const fn clear(code: MemberCode) -> Self {
        Self::new(code, PenaltyState::Clear)
    }

    /// Public identifier.
    #[must_use]
    pub const fn code(&self) -> &MemberCode {
        &self.code
    }

    /// Current penalty standing.
    #[must_use]
    pub const fn penalty(&self) -> PenaltyState {
        self.penalty
    }

    /// Replace the penalty standing.
    pub const fn set_penalty(&mut self, penalty: PenaltyState) {
        self.penalty = penalty;
    }
}
