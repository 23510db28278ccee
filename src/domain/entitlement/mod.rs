//! Entitlement domain module.
//!
//! Purchaser identity, plan labels, the allowlist record, and the Stripe
//! webhook types needed to turn a completed checkout into an entitlement.
//!
//! # Module Structure
//!
//! - `identity` - Normalized purchaser identity
//! - `plan_label` - Best-effort plan description
//! - `record` - Allowlist entry
//! - `checkout_session` - Tolerant checkout session object and identity resolution
//! - `stripe_event` - Webhook event envelope
//! - `webhook_verifier` - HMAC signature verification

mod checkout_session;
mod errors;
mod identity;
mod plan_label;
mod record;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use checkout_session::{
    CheckoutSessionObject, CustomerDetails, ExpandableProduct, LineItem, LineItemList,
    LineItemPrice, ProductObject, Recurring, ResolvedIdentity, PLAN_HINT_METADATA_KEYS,
};
pub use errors::EntitlementError;
pub use identity::{Identity, UNKNOWN_IDENTITY};
pub use plan_label::{PlanLabel, PLACEHOLDER_PLAN_LABEL};
pub use record::EntitlementRecord;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_header;
