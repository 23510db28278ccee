//! EntitlementStore port - Durable allowlist keyed by normalized identity.
//!
//! Existence of a record is the entitlement. Implementations must make
//! `insert` an atomic conditional write (insert-if-absent); a
//! read-then-write sequence would let two concurrent deliveries of the
//! same purchase race each other.

use async_trait::async_trait;

use crate::domain::entitlement::{EntitlementRecord, Identity, PlanLabel};
use crate::domain::foundation::DomainError;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The identity was not present; this record is now stored.
    Inserted(EntitlementRecord),
    /// A record already existed and was left untouched.
    AlreadyPresent,
}

impl InsertOutcome {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Result of a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

/// Port for the entitlement allowlist.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Inserts a record unless one already exists for the identity.
    ///
    /// First write wins: an existing record's plan label and timestamp are
    /// never overwritten.
    async fn insert(
        &self,
        identity: &Identity,
        plan_label: &PlanLabel,
    ) -> Result<InsertOutcome, DomainError>;

    /// Deletes the record for the identity, if any.
    async fn remove(&self, identity: &Identity) -> Result<RemoveOutcome, DomainError>;

    /// Returns true if a committed record exists for the identity.
    async fn exists(&self, identity: &Identity) -> Result<bool, DomainError>;

    /// Loads the record for the identity.
    async fn find(&self, identity: &Identity) -> Result<Option<EntitlementRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entitlement_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn EntitlementStore) {}
    }

    #[test]
    fn insert_outcome_was_inserted() {
        let record = EntitlementRecord::new(
            Identity::parse("a@b.com").unwrap(),
            PlanLabel::placeholder(),
        );
        assert!(InsertOutcome::Inserted(record).was_inserted());
        assert!(!InsertOutcome::AlreadyPresent.was_inserted());
    }
}
