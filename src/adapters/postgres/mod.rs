//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresEntitlementStore` - Allowlist table with insert-if-absent
//! - `PostgresWebhookEventLog` - Webhook audit trail

mod entitlement_store;
mod pool;
mod webhook_event_log;

pub use entitlement_store::PostgresEntitlementStore;
pub use pool::{connect_pool, run_migrations};
pub use webhook_event_log::PostgresWebhookEventLog;
