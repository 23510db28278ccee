//! HTTP adapter for entitlement endpoints.
//!
//! - `POST /create-session` - Start a hosted checkout
//! - `POST /webhook` - Handle Stripe webhooks
//! - `GET /entitlement` - Check whether an identity is entitled
//! - `GET /health` - Liveness and store readiness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{
    CheckoutApiError, EntitlementAppState, EntitlementQueryError, WebhookApiError,
    STRIPE_SIGNATURE_HEADER,
};
pub use routes::entitlement_router;
