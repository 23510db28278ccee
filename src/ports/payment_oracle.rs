//! Payment oracle port for the hosted-checkout provider.
//!
//! The relay treats the provider as a trusted oracle: it creates checkout
//! sessions and answers plan lookups. Nothing here mutates local state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{LineItem, ProductObject};
use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentOracle: Send + Sync {
    /// Create a hosted subscription checkout session.
    ///
    /// Returns the session id and, when the provider supplies one, the
    /// hosted payment page URL.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// List a completed session's line items with price and product expanded.
    async fn list_line_items(&self, session_id: &str) -> Result<Vec<LineItem>, PaymentError>;

    /// Retrieve a product by id.
    async fn retrieve_product(&self, product_id: &str) -> Result<ProductObject, PaymentError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Provider price id of the plan.
    pub plan_id: String,

    /// Forwarded verbatim as `client_reference_id`.
    pub purchaser_identity: String,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Checkout session handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// Hosted payment page, when returned.
    pub url: Option<String>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::NotFound => ErrorCode::NotFound,
            PaymentErrorCode::InvalidRequest => ErrorCode::ValidationFailed,
            _ => ErrorCode::ExternalServiceError,
        };

        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Request rejected (unknown price, bad parameter).
    InvalidRequest,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_oracle_is_object_safe() {
        fn _accepts_dyn(_oracle: &dyn PaymentOracle) {}
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentErrorCode::NetworkError.is_retryable());
        assert!(PaymentErrorCode::RateLimitExceeded.is_retryable());

        assert!(!PaymentErrorCode::InvalidRequest.is_retryable());
        assert!(!PaymentErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::invalid_request("No such price: 'price_x'");
        assert_eq!(err.to_string(), "invalid_request: No such price: 'price_x'");
        assert!(!err.retryable);
    }

    #[test]
    fn with_provider_code_is_kept() {
        let err = PaymentError::provider("boom").with_provider_code("resource_missing");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn payment_error_converts_to_domain_error() {
        let domain_err: DomainError = PaymentError::not_found("Product").into();
        assert_eq!(domain_err.code, ErrorCode::NotFound);
        assert_eq!(domain_err.message(), "Product not found");
    }
}
