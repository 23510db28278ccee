//! HTTP handlers for entitlement endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, CheckoutRedirects,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookError, HandlePaymentWebhookHandler,
};
use crate::application::readiness::StoreReadiness;
use crate::domain::entitlement::{EntitlementError, StripeWebhookVerifier};
use crate::ports::PaymentOracle;

use super::dto::{
    CreateSessionRequest, CreateSessionResponse, EntitlementQueryParams, EntitlementResponse,
    ErrorMessageResponse, HealthResponse, WebhookAck,
};

/// Header carrying the webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; everything inside is either `Arc`-wrapped or cheap.
#[derive(Clone)]
pub struct EntitlementAppState {
    pub payment_oracle: Arc<dyn PaymentOracle>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub redirects: CheckoutRedirects,
    pub readiness: StoreReadiness,
}

impl EntitlementAppState {
    pub fn new(
        payment_oracle: Arc<dyn PaymentOracle>,
        webhook_verifier: Arc<StripeWebhookVerifier>,
        redirects: CheckoutRedirects,
        readiness: StoreReadiness,
    ) -> Self {
        Self {
            payment_oracle,
            webhook_verifier,
            redirects,
            readiness,
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn create_checkout_session_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(self.payment_oracle.clone(), self.redirects.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.payment_oracle.clone(),
            self.readiness.clone(),
        )
    }

    pub fn check_entitlement_handler(&self) -> CheckEntitlementHandler {
        CheckEntitlementHandler::new(self.readiness.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /create-session - Start a hosted subscription checkout
pub async fn create_session(
    State(state): State<EntitlementAppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let handler = state.create_checkout_session_handler();
    let cmd = CreateCheckoutSessionCommand {
        plan_id: request.plan_id,
        purchaser_identity: request.purchaser_identity,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CreateSessionResponse {
        session_id: result.session_id,
        url: result.redirect_url,
    }))
}

/// POST /webhook - Handle Stripe webhook events
///
/// Every verified delivery is acknowledged, including ignored event types
/// and failed store writes.
pub async fn handle_stripe_webhook(
    State(state): State<EntitlementAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let result = handler.handle(cmd).await?;
    tracing::debug!(event_id = %result.event_id, "Webhook acknowledged");

    Ok(Json(WebhookAck::received()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /entitlement?identity=... - Check whether an identity is entitled
pub async fn check_entitlement(
    State(state): State<EntitlementAppState>,
    Query(params): Query<EntitlementQueryParams>,
) -> Result<impl IntoResponse, EntitlementQueryError> {
    let handler = state.check_entitlement_handler();
    let query = CheckEntitlementQuery {
        identity: params.into_identity(),
    };

    let result = handler.handle(query).await?;

    Ok(Json(EntitlementResponse::from(result)))
}

/// GET /health - Liveness plus store readiness
pub async fn health(State(state): State<EntitlementAppState>) -> impl IntoResponse {
    Json(HealthResponse::ok(state.readiness.is_ready()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Create-session failures, rendered as `{ message }`.
#[derive(Debug)]
pub struct CheckoutApiError(EntitlementError);

impl From<EntitlementError> for CheckoutApiError {
    fn from(err: EntitlementError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EntitlementError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorMessageResponse::new(self.0.message()))).into_response()
    }
}

/// Webhook rejections.
///
/// Verification failures are plain text so the provider's dashboard shows
/// the reason verbatim.
#[derive(Debug)]
pub struct WebhookApiError(HandlePaymentWebhookError);

impl From<HandlePaymentWebhookError> for WebhookApiError {
    fn from(err: HandlePaymentWebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self.0 {
            HandlePaymentWebhookError::Rejected(err) => {
                (err.status_code(), format!("Webhook Error: {err}")).into_response()
            }
            HandlePaymentWebhookError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorMessageResponse::new(
                    EntitlementError::ServiceUnavailable.message(),
                )),
            )
                .into_response(),
        }
    }
}

/// Entitlement lookup failures. Always reports `active: false`.
#[derive(Debug)]
pub struct EntitlementQueryError(EntitlementError);

impl From<EntitlementError> for EntitlementQueryError {
    fn from(err: EntitlementError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EntitlementQueryError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EntitlementError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(EntitlementResponse::inactive())).into_response()
    }
}
