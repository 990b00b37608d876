//! Port for member records.

use async_trait::async_trait;

use crate::domain::{Member, MemberCode, PenaltyState};

use super::LendingStoreError;

/// Member lookups and penalty updates inside a unit of work.
#[async_trait]
pub trait MembershipStore: Send {
    /// Fetch a member, locking the row where supported.
    async fn find_member(&mut self, code: &MemberCode)
    -> Result<Option<Member>, LendingStoreError>;

    /// All members ordered by code.
    async fn list_members(&mut self) -> Result<Vec<Member>, LendingStoreError>;

    /// Insert `member` unless its code already exists. Returns whether a row
    /// was written.
    async fn insert_member(&mut self, member: &Member) -> Result<bool, LendingStoreError>;

    /// Overwrite the member's penalty columns.
    async fn update_penalty(
        &mut self,
        code: &MemberCode,
        penalty: PenaltyState,
    ) -> Result<(), LendingStoreError>;
}
