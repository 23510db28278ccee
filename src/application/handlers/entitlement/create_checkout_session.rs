//! CreateCheckoutSessionHandler - Starts a hosted subscription checkout.

use std::sync::Arc;

use crate::domain::entitlement::EntitlementError;
use crate::ports::{CreateCheckoutRequest, PaymentOracle};

/// Static redirect targets for the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirects {
    pub success_url: String,
    pub cancel_url: String,
}

/// Command to create a checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    /// Provider price id; validated by the provider.
    pub plan_id: String,
    /// Forwarded verbatim; comes back on the completion webhook.
    pub purchaser_identity: String,
}

/// Result of creating a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub redirect_url: Option<String>,
}

/// Handler for creating checkout sessions.
///
/// A thin forwarding call: no local state, no retries.
pub struct CreateCheckoutSessionHandler {
    oracle: Arc<dyn PaymentOracle>,
    redirects: CheckoutRedirects,
}

impl CreateCheckoutSessionHandler {
    pub fn new(oracle: Arc<dyn PaymentOracle>, redirects: CheckoutRedirects) -> Self {
        Self { oracle, redirects }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, EntitlementError> {
        let request = CreateCheckoutRequest {
            plan_id: cmd.plan_id.clone(),
            purchaser_identity: cmd.purchaser_identity,
            success_url: self.redirects.success_url.clone(),
            cancel_url: self.redirects.cancel_url.clone(),
        };

        let session = self
            .oracle
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::warn!(
                    plan_id = %cmd.plan_id,
                    error_code = %e.code,
                    error = %e.message,
                    "Checkout session creation failed"
                );
                EntitlementError::upstream(e.message)
            })?;

        tracing::info!(session_id = %session.id, plan_id = %cmd.plan_id, "Checkout session created");

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            redirect_url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentOracle;
    use crate::ports::PaymentError;

    fn redirects() -> CheckoutRedirects {
        CheckoutRedirects {
            success_url: "https://app.example.com/success".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
        }
    }

    fn command() -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            plan_id: "price_pro".to_string(),
            purchaser_identity: "Buyer@Example.com".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn returns_session_handle() {
        let oracle = Arc::new(MockPaymentOracle::new());
        oracle.set_checkout_url("https://checkout.stripe.com/c/pay/cs_test_1");
        let handler = CreateCheckoutSessionHandler::new(oracle.clone(), redirects());

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.session_id, "cs_test_1");
        assert_eq!(
            result.redirect_url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_1")
        );
    }

    #[tokio::test]
    async fn forwards_identity_and_redirects_verbatim() {
        let oracle = Arc::new(MockPaymentOracle::new());
        let handler = CreateCheckoutSessionHandler::new(oracle.clone(), redirects());

        handler.handle(command()).await.unwrap();

        let requests = oracle.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purchaser_identity, "Buyer@Example.com");
        assert_eq!(requests[0].plan_id, "price_pro");
        assert_eq!(requests[0].success_url, "https://app.example.com/success");
        assert_eq!(requests[0].cancel_url, "https://app.example.com/cancel");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn oracle_rejection_is_upstream_failure_with_provider_message() {
        let oracle = Arc::new(MockPaymentOracle::new());
        oracle.fail_method(
            "create_checkout_session",
            PaymentError::invalid_request("No such price: 'price_pro'"),
        );
        let handler = CreateCheckoutSessionHandler::new(oracle.clone(), redirects());

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(
            err,
            EntitlementError::UpstreamRequestFailed("No such price: 'price_pro'".to_string())
        );
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let oracle = Arc::new(MockPaymentOracle::new());
        oracle.fail_method("create_checkout_session", PaymentError::network("timed out"));
        let handler = CreateCheckoutSessionHandler::new(oracle.clone(), redirects());

        let _ = handler.handle(command()).await;

        assert_eq!(oracle.call_count("create_checkout_session"), 1);
    }
}
