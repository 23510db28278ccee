//! CheckEntitlementHandler - Query handler for "is this identity entitled?".

use crate::application::readiness::StoreReadiness;
use crate::domain::entitlement::{EntitlementError, EntitlementRecord, Identity};

/// Query to check an identity.
#[derive(Debug, Clone, Default)]
pub struct CheckEntitlementQuery {
    /// Raw identity as supplied by the caller; normalized here.
    pub identity: Option<String>,
}

/// Result of an entitlement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntitlementResult {
    pub active: bool,
    /// The stored record when active.
    pub record: Option<EntitlementRecord>,
}

impl CheckEntitlementResult {
    fn inactive() -> Self {
        Self {
            active: false,
            record: None,
        }
    }
}

/// Handler for entitlement lookups.
///
/// Reads committed store state on every call; there is no cache.
pub struct CheckEntitlementHandler {
    readiness: StoreReadiness,
}

impl CheckEntitlementHandler {
    pub fn new(readiness: StoreReadiness) -> Self {
        Self { readiness }
    }

    /// Looks up the identity and returns the record if one exists.
    ///
    /// A missing or blank identity is inactive without touching the store.
    pub async fn handle(
        &self,
        query: CheckEntitlementQuery,
    ) -> Result<CheckEntitlementResult, EntitlementError> {
        let stores = self.readiness.stores()?;

        let Some(identity) = Identity::from_optional(query.identity.as_deref()) else {
            return Ok(CheckEntitlementResult::inactive());
        };

        let record = stores.entitlements.find(&identity).await.map_err(|e| {
            tracing::error!(identity = %identity, error = %e, "Entitlement lookup failed");
            EntitlementError::store_read(e.to_string())
        })?;

        Ok(CheckEntitlementResult {
            active: record.is_some(),
            record,
        })
    }

    /// Existence-only check.
    pub async fn is_entitled(&self, identity: Option<&str>) -> Result<bool, EntitlementError> {
        let stores = self.readiness.stores()?;

        let Some(identity) = Identity::from_optional(identity) else {
            return Ok(false);
        };

        stores
            .entitlements
            .exists(&identity)
            .await
            .map_err(|e| EntitlementError::store_read(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEntitlementStore, InMemoryWebhookEventLog};
    use crate::application::readiness::ConnectedStores;
    use crate::domain::entitlement::PlanLabel;
    use crate::ports::EntitlementStore;
    use std::sync::Arc;

    async fn handler_with(identity: &str) -> (CheckEntitlementHandler, Arc<InMemoryEntitlementStore>) {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store
            .insert(&Identity::parse(identity).unwrap(), &PlanLabel::new("Pro (monthly)"))
            .await
            .unwrap();
        let readiness = StoreReadiness::ready(ConnectedStores::new(
            store.clone(),
            Arc::new(InMemoryWebhookEventLog::new()),
        ));
        (CheckEntitlementHandler::new(readiness), store)
    }

    fn query(identity: Option<&str>) -> CheckEntitlementQuery {
        CheckEntitlementQuery {
            identity: identity.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn lookup_is_case_and_whitespace_insensitive() {
        let (handler, _) = handler_with("Foo@Bar.com").await;

        let result = handler.handle(query(Some("foo@bar.com "))).await.unwrap();

        assert!(result.active);
        assert_eq!(result.record.unwrap().plan_label.as_str(), "Pro (monthly)");
        assert!(handler.is_entitled(Some("  FOO@BAR.COM")).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_identity_is_inactive() {
        let (handler, _) = handler_with("a@b.com").await;

        let result = handler.handle(query(Some("c@d.com"))).await.unwrap();

        assert_eq!(result, CheckEntitlementResult::inactive());
    }

    #[tokio::test]
    async fn blank_identity_is_inactive_without_store_access() {
        let (handler, store) = handler_with("a@b.com").await;
        store.set_fail_reads(true);

        assert!(!handler.handle(query(None)).await.unwrap().active);
        assert!(!handler.handle(query(Some("   "))).await.unwrap().active);
        assert!(!handler.is_entitled(None).await.unwrap());
    }

    #[tokio::test]
    async fn store_failure_is_store_read_failed() {
        let (handler, store) = handler_with("a@b.com").await;
        store.set_fail_reads(true);

        let err = handler.handle(query(Some("a@b.com"))).await.unwrap_err();

        assert!(matches!(err, EntitlementError::StoreReadFailed(_)));
        assert!(handler.is_entitled(Some("a@b.com")).await.is_err());
    }

    #[tokio::test]
    async fn closed_gate_is_service_unavailable() {
        let handler = CheckEntitlementHandler::new(StoreReadiness::new());

        let err = handler.handle(query(Some("a@b.com"))).await.unwrap_err();

        assert_eq!(err, EntitlementError::ServiceUnavailable);
    }
}
