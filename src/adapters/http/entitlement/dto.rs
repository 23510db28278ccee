//! Data Transfer Objects for entitlement HTTP endpoints.
//!
//! Field names are camelCase on the wire; the frontend already sends
//! `priceId` / `clientEmail`, so those are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::application::handlers::entitlement::CheckEntitlementResult;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a hosted checkout.
///
/// Missing fields deserialize to empty strings and are left for the
/// payment provider to reject.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default, alias = "priceId")]
    pub plan_id: String,
    #[serde(default, alias = "clientEmail")]
    pub purchaser_identity: String,
}

/// Query string for the entitlement lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitlementQueryParams {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl EntitlementQueryParams {
    /// `identity` wins over `email` when both are given.
    pub fn into_identity(self) -> Option<String> {
        self.identity.or(self.email)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Error body for create-session failures.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorMessageResponse {
    pub message: String,
}

impl ErrorMessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Acknowledgement returned for every accepted webhook delivery.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_label: Option<String>,
    /// RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

impl EntitlementResponse {
    pub fn inactive() -> Self {
        Self {
            active: false,
            plan_label: None,
            recorded_at: None,
        }
    }
}

impl From<CheckEntitlementResult> for EntitlementResponse {
    fn from(result: CheckEntitlementResult) -> Self {
        match result.record {
            Some(record) => Self {
                active: result.active,
                plan_label: Some(record.plan_label.as_str().to_string()),
                recorded_at: Some(record.recorded_at.as_datetime().to_rfc3339()),
            },
            None => Self {
                active: result.active,
                ..Self::inactive()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub store_ready: bool,
}

impl HealthResponse {
    pub fn ok(store_ready: bool) -> Self {
        Self {
            status: "ok",
            store_ready,
        }
    }
}
