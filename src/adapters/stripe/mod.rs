//! Stripe payment oracle adapter.
//!
//! Implements the `PaymentOracle` port for Stripe:
//! - Hosted checkout session creation
//! - Line item and product lookups for plan labels
//!
//! Webhook signature verification lives in the domain
//! (`domain::entitlement::StripeWebhookVerifier`) because it is pure.

mod api_types;
mod mock_payment_oracle;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeCheckoutSessionCreated, StripeErrorEnvelope, StripeList};
pub use mock_payment_oracle::{MethodCall, MockPaymentOracle};
pub use stripe_adapter::{
    StripeConfig, StripePaymentOracle, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT,
};
