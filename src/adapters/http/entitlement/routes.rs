//! Axum router configuration for entitlement endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    check_entitlement, create_session, handle_stripe_webhook, health, EntitlementAppState,
};

/// Create the entitlement relay router.
///
/// # Routes
///
/// ## Checkout (no store needed)
/// - `POST /create-session` - Start a hosted subscription checkout
///
/// ## Webhook Endpoints (no auth, signature verified)
/// - `POST /webhook` - Handle Stripe webhooks
///
/// ## Queries
/// - `GET /entitlement?identity=...` - Check whether an identity is entitled
/// - `GET /health` - Liveness and store readiness
pub fn entitlement_router() -> Router<EntitlementAppState> {
    Router::new()
        .route("/create-session", post(create_session))
        .route("/webhook", post(handle_stripe_webhook))
        .route("/entitlement", get(check_entitlement))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::adapters::stripe::MockPaymentOracle;
    use crate::application::handlers::entitlement::CheckoutRedirects;
    use crate::application::readiness::StoreReadiness;
    use crate::domain::entitlement::StripeWebhookVerifier;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_state() -> EntitlementAppState {
        EntitlementAppState::new(
            Arc::new(MockPaymentOracle::new()),
            Arc::new(StripeWebhookVerifier::new(SecretString::new(
                "whsec_routes".to_string(),
            ))),
            CheckoutRedirects {
                success_url: "https://app.example.com/ok".to_string(),
                cancel_url: "https://app.example.com/cancel".to_string(),
            },
            StoreReadiness::new(),
        )
    }

    fn app() -> Router {
        entitlement_router().with_state(test_state())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Router Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn entitlement_router_creates_router() {
        let _: Router<()> = entitlement_router().with_state(test_state());
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_session_rejects_get() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/create-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let response = app()
            .oneshot(Request::get("/v1/checkout/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
