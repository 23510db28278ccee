//! RevokeEntitlementHandler - Command handler for explicit revocation.
//!
//! Not wired to any webhook event or HTTP route; operators call it from
//! their own tooling.

use crate::application::readiness::StoreReadiness;
use crate::domain::entitlement::{EntitlementError, Identity};
use crate::ports::RemoveOutcome;

/// Command to revoke an identity's entitlement.
#[derive(Debug, Clone)]
pub struct RevokeEntitlementCommand {
    pub identity: String,
}

/// Result of a revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeEntitlementResult {
    /// False when there was nothing to remove.
    pub removed: bool,
}

/// Handler for revoking entitlements.
pub struct RevokeEntitlementHandler {
    readiness: StoreReadiness,
}

impl RevokeEntitlementHandler {
    pub fn new(readiness: StoreReadiness) -> Self {
        Self { readiness }
    }

    pub async fn handle(
        &self,
        cmd: RevokeEntitlementCommand,
    ) -> Result<RevokeEntitlementResult, EntitlementError> {
        let stores = self.readiness.stores()?;

        let Ok(identity) = Identity::parse(&cmd.identity) else {
            return Ok(RevokeEntitlementResult { removed: false });
        };

        let outcome = stores
            .entitlements
            .remove(&identity)
            .await
            .map_err(|e| EntitlementError::store_write(e.to_string()))?;

        let removed = outcome == RemoveOutcome::Removed;
        if removed {
            tracing::info!(identity = %identity, "Entitlement revoked");
        }
        Ok(RevokeEntitlementResult { removed })
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

    fn setup() -> (RevokeEntitlementHandler, Arc<InMemoryEntitlementStore>) {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let readiness = StoreReadiness::ready(ConnectedStores::new(
            store.clone(),
            Arc::new(InMemoryWebhookEventLog::new()),
        ));
        (RevokeEntitlementHandler::new(readiness), store)
    }

    fn cmd(identity: &str) -> RevokeEntitlementCommand {
        RevokeEntitlementCommand {
            identity: identity.to_string(),
        }
    }

    #[tokio::test]
    async fn revocation_removes_record_and_is_idempotent() {
        let (handler, store) = setup();
        let identity = Identity::parse("a@b.com").unwrap();
        store.insert(&identity, &PlanLabel::placeholder()).await.unwrap();

        assert!(handler.handle(cmd(" A@B.com")).await.unwrap().removed);
        assert!(!handler.handle(cmd("a@b.com")).await.unwrap().removed);
        assert!(!store.exists(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn blank_identity_removes_nothing() {
        let (handler, _) = setup();
        assert!(!handler.handle(cmd("  ")).await.unwrap().removed);
    }

    #[tokio::test]
    async fn store_failure_is_store_write_failed() {
        let (handler, store) = setup();
        store.set_fail_writes(true);

        assert!(matches!(
            handler.handle(cmd("a@b.com")).await,
            Err(EntitlementError::StoreWriteFailed(_))
        ));
    }

    #[tokio::test]
    async fn closed_gate_is_service_unavailable() {
        let handler = RevokeEntitlementHandler::new(StoreReadiness::new());
        assert_eq!(
            handler.handle(cmd("a@b.com")).await.unwrap_err(),
            EntitlementError::ServiceUnavailable
        );
    }
}
