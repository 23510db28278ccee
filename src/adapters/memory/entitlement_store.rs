//! In-memory entitlement store.
//!
//! Backs local runs and tests. All state sits behind one lock, so
//! insert-if-absent is a single critical section.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entitlement::{EntitlementRecord, Identity, PlanLabel};
use crate::domain::foundation::DomainError;
use crate::ports::{EntitlementStore, InsertOutcome, RemoveOutcome};

/// HashMap-backed [`EntitlementStore`].
#[derive(Default)]
pub struct InMemoryEntitlementStore {
    records: RwLock<HashMap<Identity, EntitlementRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes every subsequent write return a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent read return a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_writes(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated write failure"));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlementStore {
    async fn insert(
        &self,
        identity: &Identity,
        plan_label: &PlanLabel,
    ) -> Result<InsertOutcome, DomainError> {
        self.check_writes()?;

        let mut records = self.records.write().await;
        if records.contains_key(identity) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        let record = EntitlementRecord::new(identity.clone(), plan_label.clone());
        records.insert(identity.clone(), record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn remove(&self, identity: &Identity) -> Result<RemoveOutcome, DomainError> {
        self.check_writes()?;

        let mut records = self.records.write().await;
        Ok(match records.remove(identity) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::NotPresent,
        })
    }

    async fn exists(&self, identity: &Identity) -> Result<bool, DomainError> {
        self.check_reads()?;
        Ok(self.records.read().await.contains_key(identity))
    }

    async fn find(&self, identity: &Identity) -> Result<Option<EntitlementRecord>, DomainError> {
        self.check_reads()?;
        Ok(self.records.read().await.get(identity).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn insert_then_exists() {
        let store = InMemoryEntitlementStore::new();

        let outcome = store.insert(&id("a@b.com"), &PlanLabel::new("Pro")).await.unwrap();

        assert!(outcome.was_inserted());
        assert!(store.exists(&id("A@B.com ")).await.unwrap());
    }

    #[tokio::test]
    async fn second_insert_keeps_first_record() {
        let store = InMemoryEntitlementStore::new();
        let first = match store.insert(&id("a@b.com"), &PlanLabel::new("Pro")).await.unwrap() {
            InsertOutcome::Inserted(record) => record,
            InsertOutcome::AlreadyPresent => panic!("expected insert"),
        };

        let second = store.insert(&id("a@b.com"), &PlanLabel::new("Team")).await.unwrap();

        assert_eq!(second, InsertOutcome::AlreadyPresent);
        let stored = store.find(&id("a@b.com")).await.unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryEntitlementStore::new();
        store.insert(&id("a@b.com"), &PlanLabel::placeholder()).await.unwrap();

        assert_eq!(store.remove(&id("a@b.com")).await.unwrap(), RemoveOutcome::Removed);
        assert_eq!(store.remove(&id("a@b.com")).await.unwrap(), RemoveOutcome::NotPresent);
        assert!(!store.exists(&id("a@b.com")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_inserts_store_exactly_one() {
        let store = Arc::new(InMemoryEntitlementStore::new());

        let tasks = (0..16).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert(&id("race@b.com"), &PlanLabel::new(format!("Plan {}", i)))
                    .await
                    .unwrap()
            })
        });
        let outcomes = futures::future::join_all(tasks).await;

        let inserted = outcomes
            .into_iter()
            .map(|r| r.unwrap())
            .filter(InsertOutcome::was_inserted)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn failure_injection_surfaces_database_errors() {
        let store = InMemoryEntitlementStore::new();
        store.set_fail_writes(true);
        store.set_fail_reads(true);

        assert!(store.insert(&id("a@b.com"), &PlanLabel::placeholder()).await.is_err());
        assert!(store.exists(&id("a@b.com")).await.is_err());

        store.set_fail_writes(false);
        store.set_fail_reads(false);
        assert!(store.is_empty().await);
    }
}
