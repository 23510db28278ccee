//! Stripe REST wire types used by the adapter.
//!
//! Only the response shapes the relay reads. Line items and products reuse
//! the tolerant domain structs.

use serde::{Deserialize, Serialize};

/// Stripe list envelope (`{"object":"list","data":[...]}`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// Response of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSessionCreated {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted payment page.
    #[serde(default)]
    pub url: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

/// Stripe API error body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeApiError {
    #[serde(default)]
    pub message: Option<String>,

    /// Error category (invalid_request_error, api_error, ...).
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// Machine-readable code (resource_missing, ...).
    #[serde(default)]
    pub code: Option<String>,
}
