//! Lending rules: the borrowing limit and the late-return penalty.
//!
//! The policy is plain data plus pure functions. The lending service applies
//! it to state read inside a unit of work; nothing here touches storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use super::{Loan, PenaltyState};

/// Active loans a member may hold unless configured otherwise.
pub const DEFAULT_BORROW_LIMIT: u32 = 2;
/// Whole days a loan may be held before its return counts as late.
pub const DEFAULT_LATE_AFTER_DAYS: u32 = 7;
/// Length of an expiring penalty unless configured otherwise.
pub const DEFAULT_PENALTY_DAYS: u32 = 3;
/// Longest expiring penalty accepted, roughly a century. Longer penalties
/// should be configured as `permanent`.
pub const MAX_PENALTY_DAYS: u32 = 36_500;

/// How long a late return bars the member from borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyDuration {
    /// Penalty ends this many days after the late return.
    Days(u32),
    /// No expiry; the penalty must be cleared out of band.
    Permanent,
}

impl Default for PenaltyDuration {
    fn default() -> Self {
        Self::Days(DEFAULT_PENALTY_DAYS)
    }
}

/// Rejected lending configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingPolicyError {
    /// A limit of zero would refuse every borrow.
    #[error("borrow limit must be at least 1")]
    ZeroBorrowLimit,
    /// Not `permanent` and not a day count in `1..=MAX_PENALTY_DAYS`.
    #[error(
        "penalty duration must be 1 to {MAX_PENALTY_DAYS} days or \"permanent\", got {value:?}"
    )]
    InvalidPenaltyDuration {
        /// Input as given.
        value: String,
    },
}

impl PenaltyDuration {
    fn validated(self) -> Result<Self, LendingPolicyError> {
        match self {
            Self::Days(days) if days == 0 || days > MAX_PENALTY_DAYS => {
                Err(LendingPolicyError::InvalidPenaltyDuration {
                    value: days.to_string(),
                })
            }
            valid => Ok(valid),
        }
    }
}

impl FromStr for PenaltyDuration {
    type Err = LendingPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("permanent") {
            return Ok(Self::Permanent);
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(|days| Self::Days(days).validated().ok())
            .ok_or_else(|| LendingPolicyError::InvalidPenaltyDuration {
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for PenaltyDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}"),
            Self::Permanent => f.write_str("permanent"),
        }
    }
}

/// Outcome of applying the late rule to a loan being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnAssessment {
    /// Whole days between borrow and return, rounded down.
    pub days_elapsed: i64,
    /// Penalty to record on the member, if the return is late.
    pub penalty: Option<PenaltyState>,
}

/// Configured lending rules.
///
/// # Examples
/// ```
/// use library_backend::domain::{LendingPolicy, PenaltyDuration};
///
/// let policy = LendingPolicy::default();
/// assert_eq!(policy.borrow_limit(), 2);
/// assert_eq!(policy.penalty_duration(), PenaltyDuration::Days(3));
/// assert!(policy.has_capacity(1));
/// assert!(!policy.has_capacity(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingPolicy {
    borrow_limit: u32,
    late_after_days: u32,
    penalty_duration: PenaltyDuration,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            borrow_limit: DEFAULT_BORROW_LIMIT,
            late_after_days: DEFAULT_LATE_AFTER_DAYS,
            penalty_duration: PenaltyDuration::default(),
        }
    }
}

impl LendingPolicy {
    /// Validate and build a policy.
    ///
    /// # Errors
    /// [`LendingPolicyError::ZeroBorrowLimit`] for a zero limit and
    /// [`LendingPolicyError::InvalidPenaltyDuration`] for a day count outside
    /// `1..=MAX_PENALTY_DAYS`.
    pub fn new(
        borrow_limit: u32,
        late_after_days: u32,
        penalty_duration: PenaltyDuration,
    ) -> Result<Self, LendingPolicyError> {
        if borrow_limit == 0 {
            return Err(LendingPolicyError::ZeroBorrowLimit);
        }
        Ok(Self {
            borrow_limit,
            late_after_days,
            penalty_duration: penalty_duration.validated()?,
        })
    }

    /// Maximum simultaneous active loans per member.
    #[must_use]
    pub const fn borrow_limit(&self) -> u32 {
        self.borrow_limit
    }

    /// Whole days a loan may be held before its return is late.
    #[must_use]
    pub const fn late_after_days(&self) -> u32 {
        self.late_after_days
    }

    /// Penalty applied by a late return.
    #[must_use]
    pub const fn penalty_duration(&self) -> PenaltyDuration {
        self.penalty_duration
    }

    /// Whether a member holding `active_loans` may take one more.
    #[must_use]
    pub const fn has_capacity(&self, active_loans: u32) -> bool {
        active_loans < self.borrow_limit
    }

    /// Late means strictly more whole days than the threshold.
    #[must_use]
    pub fn is_late(&self, days_elapsed: i64) -> bool {
        days_elapsed > i64::from(self.late_after_days)
    }

    /// Penalty imposed by a late return processed at `now`.
    ///
    /// An expiry past the last representable instant is recorded as a
    /// permanent penalty.
    #[must_use]
    pub fn penalty_starting(&self, now: DateTime<Utc>) -> PenaltyState {
        match self.penalty_duration {
            PenaltyDuration::Days(days) => now
                .checked_add_signed(Duration::days(i64::from(days)))
                .map_or(PenaltyState::Permanent, PenaltyState::Until),
            PenaltyDuration::Permanent => PenaltyState::Permanent,
        }
    }

    /// Elapsed days for `loan` and the penalty due if it is returned at `now`.
    #[must_use]
    pub fn assess_return(&self, loan: &Loan, now: DateTime<Utc>) -> ReturnAssessment {
        let days_elapsed = loan.whole_days_elapsed(now);
        let penalty = self
            .is_late(days_elapsed)
            .then(|| self.penalty_starting(now));
        ReturnAssessment {
            days_elapsed,
            penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookCode, LoanId, MemberCode};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn borrowed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn loan_from(borrowed_at: DateTime<Utc>) -> Loan {
        Loan::open(
            LoanId::random(),
            MemberCode::new("M001").expect("member code"),
            BookCode::new("JK-45").expect("book code"),
            borrowed_at,
        )
    }

    #[rstest]
    #[case("3", PenaltyDuration::Days(3))]
    #[case(" 14 ", PenaltyDuration::Days(14))]
    #[case("permanent", PenaltyDuration::Permanent)]
    #[case("PERMANENT", PenaltyDuration::Permanent)]
    fn parses_penalty_durations(#[case] raw: &str, #[case] expected: PenaltyDuration) {
        assert_eq!(raw.parse::<PenaltyDuration>(), Ok(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("forever")]
    #[case("")]
    #[case("36501")]
    #[case("1000000000")]
    fn rejects_invalid_penalty_durations(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<PenaltyDuration>(),
            Err(LendingPolicyError::InvalidPenaltyDuration { .. })
        ));
    }

    #[rstest]
    fn accepts_the_longest_expiring_penalty() {
        assert_eq!(
            "36500".parse::<PenaltyDuration>(),
            Ok(PenaltyDuration::Days(MAX_PENALTY_DAYS))
        );
    }

    #[rstest]
    #[case(PenaltyDuration::Days(0))]
    #[case(PenaltyDuration::Days(1_000_000_000))]
    fn policy_rejects_out_of_range_penalty_days(#[case] duration: PenaltyDuration) {
        assert!(matches!(
            LendingPolicy::new(2, 7, duration),
            Err(LendingPolicyError::InvalidPenaltyDuration { .. })
        ));
    }

    #[rstest]
    fn longest_penalty_on_a_late_return_has_an_expiry(borrowed_at: DateTime<Utc>) {
        let policy = LendingPolicy::new(2, 7, PenaltyDuration::Days(MAX_PENALTY_DAYS))
            .expect("valid policy");
        let now = borrowed_at + Duration::days(8);
        let assessment = policy.assess_return(&loan_from(borrowed_at), now);
        assert_eq!(
            assessment.penalty,
            Some(PenaltyState::Until(
                now + Duration::days(i64::from(MAX_PENALTY_DAYS))
            ))
        );
    }

    #[rstest]
    fn penalties_past_the_calendar_end_become_permanent() {
        let policy = LendingPolicy::default();
        assert_eq!(
            policy.penalty_starting(DateTime::<Utc>::MAX_UTC),
            PenaltyState::Permanent
        );
    }

    #[rstest]
    fn rejects_zero_borrow_limit() {
        assert_eq!(
            LendingPolicy::new(0, 7, PenaltyDuration::Days(3)),
            Err(LendingPolicyError::ZeroBorrowLimit)
        );
    }

    #[rstest]
    #[case(Duration::days(7) + Duration::hours(23), false)]
    #[case(Duration::days(8), true)]
    fn only_more_than_seven_whole_days_is_late(
        borrowed_at: DateTime<Utc>,
        #[case] held_for: Duration,
        #[case] late: bool,
    ) {
        let policy = LendingPolicy::default();
        let now = borrowed_at + held_for;
        let assessment = policy.assess_return(&loan_from(borrowed_at), now);
        assert_eq!(assessment.penalty.is_some(), late);
    }

    #[rstest]
    fn late_return_penalises_for_three_days_from_return(borrowed_at: DateTime<Utc>) {
        let now = borrowed_at + Duration::days(8);
        let assessment = LendingPolicy::default().assess_return(&loan_from(borrowed_at), now);
        assert_eq!(assessment.days_elapsed, 8);
        assert_eq!(
            assessment.penalty,
            Some(PenaltyState::Until(now + Duration::days(3)))
        );
    }

    #[rstest]
    fn permanent_policy_records_no_expiry(borrowed_at: DateTime<Utc>) {
        let policy =
            LendingPolicy::new(2, 7, PenaltyDuration::Permanent).expect("valid policy");
        let now = borrowed_at + Duration::days(30);
        let assessment = policy.assess_return(&loan_from(borrowed_at), now);
        assert_eq!(assessment.penalty, Some(PenaltyState::Permanent));
    }
}
