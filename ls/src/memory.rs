//! In-memory ledger store for tests
//!
//! Mirrors the SQLite implementation's behavior, including the phone
//! uniqueness constraint, so router and job tests can run against it
//! without touching disk.

use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::now_ms;
use crate::records::{Contribution, Member, NewContribution};
use crate::store::LedgerStore;

#[derive(Default)]
struct Inner {
    members: Vec<Member>,
    admins: HashSet<String>,
    contributions: Vec<Contribution>,
}

/// In-memory [`LedgerStore`]
#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning only happens if a test panicked while holding the lock
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, StoreError> {
        Ok(self.lock().members.iter().find(|m| m.phone == phone).cloned())
    }

    async fn insert_member(&self, name: &str, phone: &str) -> Result<Member, StoreError> {
        let mut inner = self.lock();
        if inner.members.iter().any(|m| m.phone == phone) {
            return Err(StoreError::DuplicateMember { phone: phone.to_string() });
        }
        let member = Member {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: now_ms(),
        };
        inner.members.push(member.clone());
        Ok(member)
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.lock().members.clone())
    }

    async fn is_admin(&self, phone: &str) -> Result<bool, StoreError> {
        Ok(self.lock().admins.contains(phone))
    }

    async fn insert_admin(&self, phone: &str) -> Result<(), StoreError> {
        self.lock().admins.insert(phone.to_string());
        Ok(())
    }

    async fn insert_contribution(&self, new: NewContribution) -> Result<Contribution, StoreError> {
        let mut inner = self.lock();
        if !inner.members.iter().any(|m| m.id == new.member_id) {
            return Err(StoreError::UnknownMember(new.member_id));
        }
        let contribution = Contribution {
            id: Uuid::now_v7().to_string(),
            member_id: new.member_id,
            amount: new.amount,
            period: new.period,
            category: new.category,
            created_at: now_ms(),
        };
        inner.contributions.push(contribution.clone());
        Ok(contribution)
    }

    async fn contributions_for_member(&self, member_id: &str) -> Result<Vec<Contribution>, StoreError> {
        Ok(self
            .lock()
            .contributions
            .iter()
            .filter(|c| c.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn contributions_for_period(
        &self,
        member_id: &str,
        period: &str,
    ) -> Result<Vec<Contribution>, StoreError> {
        Ok(self
            .lock()
            .contributions
            .iter()
            .filter(|c| c.member_id == member_id && c.period == period)
            .cloned()
            .collect())
    }
}
