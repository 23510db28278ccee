//! HandlePaymentWebhookHandler - Command handler for inbound Stripe webhooks.

use std::sync::Arc;

use thiserror::Error;

use crate::application::readiness::StoreReadiness;
use crate::domain::entitlement::{StripeWebhookVerifier, WebhookError};
use crate::ports::PaymentOracle;

use super::process_checkout_event::{EntitlementEventProcessor, PlanResolver, ProcessedOutcome};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, byte for byte as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlePaymentWebhookResult {
    pub event_id: String,
    pub outcome: ProcessedOutcome,
}

/// Why a delivery was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlePaymentWebhookError {
    /// Authentication or parsing failed; never processed.
    #[error(transparent)]
    Rejected(#[from] WebhookError),

    /// The entitlement store is not connected yet.
    #[error("Entitlement store is not ready")]
    NotReady,
}

/// Handler for processing payment provider webhooks.
///
/// Verification runs first and does not need the store, so a forged
/// delivery is rejected with 400 even before the store is ready.
pub struct HandlePaymentWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    oracle: Arc<dyn PaymentOracle>,
    readiness: StoreReadiness,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        oracle: Arc<dyn PaymentOracle>,
        readiness: StoreReadiness,
    ) -> Self {
        Self {
            verifier,
            oracle,
            readiness,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, HandlePaymentWebhookError> {
        // 1. Verify signature and parse event
        let signature = cmd.signature.as_deref().unwrap_or_default();
        let event = self.verifier.verify(&cmd.payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Rejected webhook delivery");
            e
        })?;

        // 2. Readiness gate
        let stores = self.readiness.stores().map_err(|_| {
            tracing::warn!(event_id = %event.id, "Webhook received before store was ready");
            HandlePaymentWebhookError::NotReady
        })?;

        // 3. Process
        let processor = EntitlementEventProcessor::new(
            stores.entitlements,
            stores.event_log,
            PlanResolver::new(self.oracle.clone()),
        );
        let outcome = processor.process(&event).await;

        Ok(HandlePaymentWebhookResult {
            event_id: event.id,
            outcome,
        })
    }
}
