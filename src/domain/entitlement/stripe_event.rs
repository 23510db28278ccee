//! Stripe webhook event envelope.
//!
//! Only the envelope is parsed strictly (`id`, `type`, `data.object`). The
//! inner object stays as raw JSON until the processor knows which type to
//! expect.

use serde::{Deserialize, Serialize};

/// Stripe webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_str(&self.event_type)
    }
}

/// Event types the relay distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Anything else; acknowledged without effect.
    Other,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::Other => "other",
        }
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}
