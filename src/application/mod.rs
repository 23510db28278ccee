//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept apart from query handlers (read).

pub mod handlers;
pub mod readiness;

pub use handlers::{
    CheckEntitlementHandler, CheckEntitlementQuery, CheckEntitlementResult, CheckoutRedirects,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    EntitlementEventProcessor, HandlePaymentWebhookCommand, HandlePaymentWebhookError,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, PlanResolver, ProcessedOutcome,
    RevokeEntitlementCommand, RevokeEntitlementHandler, RevokeEntitlementResult,
};
pub use readiness::{ConnectedStores, StoreReadiness};
