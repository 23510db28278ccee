//! Store readiness gate.
//!
//! The store connection is established by a startup task. Until it lands,
//! handlers that need the store answer `ServiceUnavailable` instead of
//! touching a half-initialized backend.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::domain::entitlement::EntitlementError;
use crate::ports::{EntitlementStore, WebhookEventLog};

/// Store handles that become available once the backend is connected.
#[derive(Clone)]
pub struct ConnectedStores {
    pub entitlements: Arc<dyn EntitlementStore>,
    pub event_log: Arc<dyn WebhookEventLog>,
}

impl ConnectedStores {
    pub fn new(entitlements: Arc<dyn EntitlementStore>, event_log: Arc<dyn WebhookEventLog>) -> Self {
        Self {
            entitlements,
            event_log,
        }
    }
}

/// Write-once gate shared between the startup task and request handlers.
#[derive(Clone, Default)]
pub struct StoreReadiness {
    stores: Arc<OnceCell<ConnectedStores>>,
}

impl StoreReadiness {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate that is already open.
    pub fn ready(stores: ConnectedStores) -> Self {
        let readiness = Self::new();
        // A fresh cell is always empty.
        let _ = readiness.stores.set(stores);
        readiness
    }

    /// Opens the gate. Returns false if it was already open; the first
    /// stores stay in place.
    pub fn mark_ready(&self, stores: ConnectedStores) -> bool {
        self.stores.set(stores).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.stores.get().is_some()
    }

    /// Returns the connected stores.
    ///
    /// # Errors
    ///
    /// `EntitlementError::ServiceUnavailable` while the gate is closed.
    pub fn stores(&self) -> Result<ConnectedStores, EntitlementError> {
        self.stores
            .get()
            .cloned()
            .ok_or(EntitlementError::ServiceUnavailable)
    }
}
