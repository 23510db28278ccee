//! Webhook verification errors.
//!
//! Every variant is a client error: the event is not processed and the
//! provider's redelivery can be reprocessed safely.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while authenticating a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Header missing, unparseable, or no v1 signature matched.
    #[error("No signatures found matching the expected signature for payload")]
    SignatureInvalid,

    /// Signature matched but the timestamp is outside the tolerance window.
    #[error("Timestamp outside the tolerance zone")]
    SignaturePayloadStale,

    /// Signature matched but the body is not an event envelope.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
