//! Stripe payment oracle adapter.
//!
//! Implements the `PaymentOracle` port over Stripe's REST API: hosted
//! checkout session creation plus the line-item and product lookups used
//! to label entitlements.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(10));
//! let oracle = StripePaymentOracle::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::entitlement::{LineItem, ProductObject};
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentOracle,
};

use super::api_types::{StripeCheckoutSessionCreated, StripeErrorEnvelope, StripeList};

/// Default Stripe API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Upper bound on each outbound call.
    request_timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe-backed [`PaymentOracle`].
pub struct StripePaymentOracle {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentOracle {
    /// Create a new Stripe oracle with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` if the HTTP client cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PaymentError> {
        let response = self
            .http_client
            .get(url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        read_json(response).await
    }
}

/// Form parameters for a subscription checkout session.
fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][price]", request.plan_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("client_reference_id", request.purchaser_identity.clone()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("metadata[plan_id]", request.plan_id.clone()),
    ]
}

fn map_transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        return PaymentError::network(format!("Stripe request timed out: {}", err));
    }
    PaymentError::network(err.to_string())
}

/// Maps a non-success Stripe response to a `PaymentError`, preferring the
/// provider's own message.
fn map_error_response(status: StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({}): {}", status.as_u16(), body));

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::NOT_FOUND => PaymentErrorCode::NotFound,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        StatusCode::BAD_REQUEST | StatusCode::PAYMENT_REQUIRED => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match parsed.and_then(|envelope| envelope.error.code) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_error_response(status, &body));
    }

    response.json().await.map_err(|e| {
        PaymentError::new(
            PaymentErrorCode::ProviderError,
            format!("Failed to parse Stripe response: {}", e),
        )
    })
}

#[async_trait]
impl PaymentOracle for StripePaymentOracle {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = self.url("/v1/checkout/sessions");
        let params = checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let created: StripeCheckoutSessionCreated = read_json(response).await?;

        tracing::debug!(session_id = %created.id, plan_id = %request.plan_id, "Created Stripe checkout session");

        Ok(CheckoutSession {
            id: created.id,
            url: created.url,
        })
    }

    async fn list_line_items(&self, session_id: &str) -> Result<Vec<LineItem>, PaymentError> {
        let url = self.url(&format!("/v1/checkout/sessions/{}/line_items", session_id));
        let list: StripeList<LineItem> = self
            .get_json(&url, &[("expand[]", "data.price.product")])
            .await?;
        Ok(list.data)
    }

    async fn retrieve_product(&self, product_id: &str) -> Result<ProductObject, PaymentError> {
        let url = self.url(&format!("/v1/products/{}", product_id));
        self.get_json(&url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StripeConfig {
        StripeConfig::new(SecretString::new("sk_test_key".to_string()))
    }

    fn request() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            plan_id: "price_pro_monthly".to_string(),
            purchaser_identity: "Buyer@Example.com".to_string(),
            success_url: "https://app.example.com/success".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = test_config();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = test_config().with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn oracle_builds_urls_from_base() {
        let oracle =
            StripePaymentOracle::new(test_config().with_base_url("http://localhost:12111")).unwrap();
        assert_eq!(
            oracle.url("/v1/products/prod_1"),
            "http://localhost:12111/v1/products/prod_1"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Encoding Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn checkout_params_describe_single_subscription_item() {
        let params = checkout_params(&request());
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("subscription"));
        assert_eq!(get("payment_method_types[0]"), Some("card"));
        assert_eq!(get("line_items[0][price]"), Some("price_pro_monthly"));
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
        assert_eq!(get("metadata[plan_id]"), Some("price_pro_monthly"));
    }

    #[test]
    fn checkout_params_forward_identity_verbatim() {
        let params = checkout_params(&request());
        assert!(params
            .iter()
            .any(|(k, v)| *k == "client_reference_id" && v == "Buyer@Example.com"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn stripe_error_message_is_preferred() {
        let body = r#"{"error":{"message":"No such price: 'price_x'","type":"invalid_request_error","code":"resource_missing"}}"#;

        let err = map_error_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.message, "No such price: 'price_x'");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn unparseable_error_body_is_included() {
        let err = map_error_response(StatusCode::BAD_GATEWAY, "upstream down");

        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert_eq!(err.message, "Stripe API error (502): upstream down");
        assert!(err.provider_code.is_none());
    }

    #[test]
    fn status_codes_map_to_error_codes() {
        assert_eq!(
            map_error_response(StatusCode::UNAUTHORIZED, "").code,
            PaymentErrorCode::AuthenticationError
        );
        assert_eq!(
            map_error_response(StatusCode::NOT_FOUND, "").code,
            PaymentErrorCode::NotFound
        );
        assert_eq!(
            map_error_response(StatusCode::TOO_MANY_REQUESTS, "").code,
            PaymentErrorCode::RateLimitExceeded
        );
    }
}
