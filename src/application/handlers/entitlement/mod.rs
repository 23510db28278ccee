//! Entitlement handlers.
//!
//! ## Commands
//! - Creating hosted checkout sessions
//! - Processing payment webhooks into entitlements
//! - Revoking entitlements
//!
//! ## Queries
//! - Checking whether an identity is entitled

mod check_entitlement;
mod create_checkout_session;
mod handle_payment_webhook;
mod process_checkout_event;
mod revoke_entitlement;

// Commands
pub use create_checkout_session::{
    CheckoutRedirects, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookError, HandlePaymentWebhookHandler,
    HandlePaymentWebhookResult,
};
pub use process_checkout_event::{EntitlementEventProcessor, PlanResolver, ProcessedOutcome};
pub use revoke_entitlement::{
    RevokeEntitlementCommand, RevokeEntitlementHandler, RevokeEntitlementResult,
};

// Queries
pub use check_entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, CheckEntitlementResult,
};
