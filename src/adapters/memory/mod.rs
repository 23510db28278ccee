//! In-memory adapters for local runs and tests.

mod entitlement_store;
mod webhook_event_log;

pub use entitlement_store::InMemoryEntitlementStore;
pub use webhook_event_log::InMemoryWebhookEventLog;
