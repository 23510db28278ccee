//! EntitlementEventProcessor - Turns a verified webhook event into an entitlement.
//!
//! ## Design
//!
//! 1. Only `checkout.session.completed` writes; every other type is ignored
//! 2. The purchaser identity is resolved with a never-fail fallback chain
//!    ending in the `unknown` sentinel, which is recorded like any identity
//! 3. The plan label is best effort; lookup failures degrade to a placeholder
//! 4. The store's insert-if-absent gives exactly-once effect per identity
//! 5. Every delivery is appended to the audit log; log failures are swallowed.
//!    A redelivered event id overwrites its earlier row, so a `failed` row
//!    is superseded once a retry succeeds
//!
//! Processing is infallible from the caller's point of view: the provider
//! gets an acknowledgment even when the store write fails, and the failure
//! is logged on the `entitlement_relay::reconciliation` target.

use std::sync::Arc;

use crate::domain::entitlement::{
    CheckoutSessionObject, EntitlementError, EntitlementRecord, Identity, LineItem, PlanLabel,
    Recurring, StripeEvent, StripeEventType,
};
use crate::ports::{
    EntitlementStore, InsertOutcome, PaymentOracle, SaveResult, WebhookEventLog,
    WebhookEventRecord, WebhookOutcome,
};

/// What processing one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessedOutcome {
    /// A new entitlement was stored.
    Recorded(EntitlementRecord),
    /// The identity was already entitled; nothing changed.
    AlreadyEntitled(Identity),
    /// The event type is not acted on.
    Ignored { event_type: String },
    /// The store write failed; the event still gets acknowledged.
    StoreWriteFailed {
        identity: Identity,
        error: EntitlementError,
    },
}

impl ProcessedOutcome {
    fn audit_outcome(&self) -> WebhookOutcome {
        match self {
            ProcessedOutcome::Recorded(_) => WebhookOutcome::Recorded,
            ProcessedOutcome::AlreadyEntitled(_) => WebhookOutcome::AlreadyEntitled,
            ProcessedOutcome::Ignored { .. } => WebhookOutcome::Ignored,
            ProcessedOutcome::StoreWriteFailed { .. } => WebhookOutcome::Failed,
        }
    }
}

/// Best-effort plan label lookup.
///
/// Order: embedded line items, provider line-item listing, provider product
/// lookup, session metadata hint, placeholder.
pub struct PlanResolver {
    oracle: Arc<dyn PaymentOracle>,
}

/// A product id whose name still has to be looked up.
struct PendingProduct {
    product_id: String,
    recurring: Option<Recurring>,
}

impl PlanResolver {
    pub fn new(oracle: Arc<dyn PaymentOracle>) -> Self {
        Self { oracle }
    }

    /// Resolves a label for the session. Never fails.
    pub async fn resolve(&self, session: &CheckoutSessionObject) -> PlanLabel {
        let mut pending: Option<PendingProduct> = None;

        if let Some(items) = session.embedded_line_items() {
            if let Some(label) = label_from_items(items, &mut pending) {
                return label;
            }
        }

        if !session.id.is_empty() {
            match self.oracle.list_line_items(&session.id).await {
                Ok(items) => {
                    if let Some(label) = label_from_items(&items, &mut pending) {
                        return label;
                    }
                }
                Err(e) => {
                    let err = EntitlementError::plan_resolution(e.to_string());
                    tracing::warn!(
                        session_id = %session.id,
                        error = %err,
                        "Line item lookup failed"
                    );
                }
            }
        }

        if let Some(pending) = pending {
            match self.oracle.retrieve_product(&pending.product_id).await {
                Ok(product) => {
                    if let Some(name) = product.name.filter(|n| !n.trim().is_empty()) {
                        let recurring = pending.recurring.as_ref();
                        return PlanLabel::from_parts(
                            &name,
                            recurring.and_then(|r| r.interval.as_deref()),
                            recurring.and_then(|r| r.interval_count),
                        );
                    }
                }
                Err(e) => {
                    let err = EntitlementError::plan_resolution(e.to_string());
                    tracing::warn!(
                        session_id = %session.id,
                        product_id = %pending.product_id,
                        error = %err,
                        "Product lookup failed"
                    );
                }
            }
        }

        session.metadata_plan_hint().unwrap_or_else(|| {
            tracing::warn!(session_id = %session.id, "Plan label unresolved, using placeholder");
            PlanLabel::placeholder()
        })
    }
}

/// Returns the first embedded label, remembering the first bare product id.
fn label_from_items(items: &[LineItem], pending: &mut Option<PendingProduct>) -> Option<PlanLabel> {
    for item in items {
        if let Some(label) = item.embedded_label() {
            return Some(label);
        }
        if pending.is_none() {
            if let Some(product_id) = item.product_id() {
                *pending = Some(PendingProduct {
                    product_id: product_id.to_string(),
                    recurring: item.recurring().cloned(),
                });
            }
        }
    }
    None
}

/// Processes verified events against the entitlement store.
pub struct EntitlementEventProcessor {
    store: Arc<dyn EntitlementStore>,
    event_log: Arc<dyn WebhookEventLog>,
    plan_resolver: PlanResolver,
}

impl EntitlementEventProcessor {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        event_log: Arc<dyn WebhookEventLog>,
        plan_resolver: PlanResolver,
    ) -> Self {
        Self {
            store,
            event_log,
            plan_resolver,
        }
    }

    /// Process one verified event. Never fails.
    pub async fn process(&self, event: &StripeEvent) -> ProcessedOutcome {
        let (outcome, detail) = match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.process_checkout(event).await,
            StripeEventType::Other => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
                (
                    ProcessedOutcome::Ignored {
                        event_type: event.event_type.clone(),
                    },
                    Some("event type not handled".to_string()),
                )
            }
        };

        self.append_audit(event, &outcome, detail).await;
        outcome
    }

    async fn process_checkout(&self, event: &StripeEvent) -> (ProcessedOutcome, Option<String>) {
        let session: CheckoutSessionObject = event.deserialize_object().unwrap_or_else(|e| {
            tracing::warn!(
                event_id = %event.id,
                error = %e,
                "Checkout session object did not parse, continuing with empty session"
            );
            CheckoutSessionObject::default()
        });

        let identity = session.purchaser_identity().into_identity();
        if identity.is_unknown() {
            tracing::warn!(
                target: "entitlement_relay::reconciliation",
                event_id = %event.id,
                session_id = %session.id,
                "Completed checkout has no purchaser identity; recording under the unknown sentinel"
            );
        }

        let plan_label = self.plan_resolver.resolve(&session).await;

        match self.store.insert(&identity, &plan_label).await {
            Ok(InsertOutcome::Inserted(record)) => {
                tracing::info!(
                    event_id = %event.id,
                    identity = %record.identity,
                    plan_label = %record.plan_label,
                    "Entitlement recorded"
                );
                (ProcessedOutcome::Recorded(record), Some(plan_label.to_string()))
            }
            Ok(InsertOutcome::AlreadyPresent) => {
                tracing::info!(event_id = %event.id, identity = %identity, "Identity already entitled");
                (ProcessedOutcome::AlreadyEntitled(identity), Some(plan_label.to_string()))
            }
            Err(e) => {
                let error = EntitlementError::store_write(e.to_string());
                tracing::error!(
                    target: "entitlement_relay::reconciliation",
                    event_id = %event.id,
                    session_id = %session.id,
                    identity = %identity,
                    plan_label = %plan_label,
                    error = %error,
                    "Entitlement write failed after acknowledged payment"
                );
                let detail = error.to_string();
                (ProcessedOutcome::StoreWriteFailed { identity, error }, Some(detail))
            }
        }
    }

    async fn append_audit(&self, event: &StripeEvent, outcome: &ProcessedOutcome, detail: Option<String>) {
        let mut record = WebhookEventRecord::new(
            &event.id,
            &event.event_type,
            outcome.audit_outcome(),
            event.data.object.clone(),
        );
        match outcome {
            ProcessedOutcome::Recorded(r) => record = record.with_identity(r.identity.as_str()),
            ProcessedOutcome::AlreadyEntitled(identity)
            | ProcessedOutcome::StoreWriteFailed { identity, .. } => {
                record = record.with_identity(identity.as_str())
            }
            _ => {}
        }
        if let Some(detail) = detail {
            record = record.with_detail(detail);
        }

        match self.event_log.append(record).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::Replaced) => {
                tracing::debug!(event_id = %event.id, "Redelivered webhook replaced earlier audit record");
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Failed to append webhook audit record");
            }
        }
    }
}
