//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod entitlement;

pub use entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, CheckEntitlementResult, CheckoutRedirects,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    EntitlementEventProcessor, HandlePaymentWebhookCommand, HandlePaymentWebhookError,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, PlanResolver, ProcessedOutcome,
    RevokeEntitlementCommand, RevokeEntitlementHandler, RevokeEntitlementResult,
};
