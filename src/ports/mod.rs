//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EntitlementStore` - Allowlist persistence with atomic insert-if-absent
//! - `PaymentOracle` - Hosted checkout and plan lookups at the payment provider
//! - `WebhookEventLog` - Audit trail of processed webhook deliveries

mod entitlement_store;
mod payment_oracle;
mod webhook_event_log;

pub use entitlement_store::{EntitlementStore, InsertOutcome, RemoveOutcome};
pub use payment_oracle::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentOracle,
};
pub use webhook_event_log::{SaveResult, WebhookEventLog, WebhookEventRecord, WebhookOutcome};
