//! WebhookEventLog port - Audit trail of processed webhook deliveries.
//!
//! The log is secondary: exactly-once entitlement comes from the store's
//! insert-if-absent, not from this table. One row is kept per event id;
//! a redelivery overwrites it so the row reflects the latest attempt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// How a delivery was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A new entitlement was recorded.
    Recorded,
    /// The identity was already entitled.
    AlreadyEntitled,
    /// Event type the relay does not act on.
    Ignored,
    /// The store write failed; needs reconciliation.
    Failed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Recorded => "recorded",
            WebhookOutcome::AlreadyEntitled => "already_entitled",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Failed => "failed",
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,

    /// Type of Stripe event (e.g., "checkout.session.completed").
    pub event_type: String,

    pub outcome: WebhookOutcome,

    /// Identity the event resolved to, if any.
    pub identity: Option<String>,

    /// Plan label, ignore reason, or error message.
    pub detail: Option<String>,

    /// Original event object for debugging.
    pub payload: serde_json::Value,

    /// When the event was processed.
    pub processed_at: DateTime<Utc>,
}

impl WebhookEventRecord {
    pub fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: WebhookOutcome,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            outcome,
            identity: None,
            detail: None,
            payload,
            processed_at: Utc::now(),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// A row for this event id existed and was overwritten (redelivery).
    Replaced,
}

/// Port for appending to the webhook audit log.
///
/// Implementations should rely on a primary key on `event_id` with
/// `ON CONFLICT DO UPDATE` semantics.
#[async_trait]
pub trait WebhookEventLog: Send + Sync {
    /// Append a record, replacing any earlier row for the same event id.
    async fn append(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Find a logged event by its Stripe event ID.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;
}
