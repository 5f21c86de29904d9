//! LedgerStore trait definition

use async_trait::async_trait;

use crate::error::StoreError;
use crate::records::{Contribution, Member, NewContribution};

/// The persistent ledger capability
///
/// Every mutation is a single-row insert; aggregation happens in the caller
/// over the rows a read returns. The store is the sole arbiter of the
/// registration check-then-insert race: two concurrent inserts for the same
/// new phone resolve through the uniqueness constraint, with the loser
/// receiving [`StoreError::DuplicateMember`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Look up a member by phone number
    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, StoreError>;

    /// Insert a new member; fails with `DuplicateMember` if the phone is taken
    async fn insert_member(&self, name: &str, phone: &str) -> Result<Member, StoreError>;

    /// All registered members
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;

    /// Whether this phone number is flagged as an admin
    async fn is_admin(&self, phone: &str) -> Result<bool, StoreError>;

    /// Flag a phone number as an admin
    ///
    /// Provisioning surface only; webhook flows never call this.
    async fn insert_admin(&self, phone: &str) -> Result<(), StoreError>;

    /// Insert one contribution row
    async fn insert_contribution(&self, new: NewContribution) -> Result<Contribution, StoreError>;

    /// Every contribution a member has ever made, oldest first
    async fn contributions_for_member(&self, member_id: &str) -> Result<Vec<Contribution>, StoreError>;

    /// A member's contributions restricted to one period, oldest first
    async fn contributions_for_period(
        &self,
        member_id: &str,
        period: &str,
    ) -> Result<Vec<Contribution>, StoreError>;
}
