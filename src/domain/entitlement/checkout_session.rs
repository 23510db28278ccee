//! Checkout session object as it arrives inside `checkout.session.completed`.
//!
//! Every field is optional or defaulted: the processor must work with
//! whatever partial data the payment provider delivers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Identity, PlanLabel};

/// Metadata keys checked, in order, for a plan label hint.
pub const PLAN_HINT_METADATA_KEYS: [&str; 3] = ["plan_label", "plan", "plan_id"];

/// Stripe Checkout Session (only the fields the relay reads).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    /// Session identifier (cs_...).
    #[serde(default)]
    pub id: String,

    /// Opaque reference supplied at session creation; carries the purchaser identity.
    #[serde(default)]
    pub client_reference_id: Option<String>,

    /// Email prefilled or entered during checkout.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Details the payer entered on the hosted page.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Present only when the session was expanded with `line_items`.
    #[serde(default)]
    pub line_items: Option<LineItemList>,
}

/// Payer-entered contact details.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Embedded list of line items.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItemList {
    #[serde(default)]
    pub data: Vec<LineItem>,
}

/// A purchased line item.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub price: Option<LineItemPrice>,
}

/// Price attached to a line item.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItemPrice {
    #[serde(default)]
    pub id: Option<String>,

    /// Product id, or the product object when expanded.
    #[serde(default)]
    pub product: Option<ExpandableProduct>,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub recurring: Option<Recurring>,
}

/// Stripe returns either the id or the whole object depending on `expand[]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExpandableProduct {
    Id(String),
    Object(ProductObject),
}

/// Product as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductObject {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// Recurring billing configuration of a price.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Recurring {
    #[serde(default)]
    pub interval: Option<String>,

    #[serde(default)]
    pub interval_count: Option<u32>,
}

/// Where the purchaser identity of a session came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// The reference supplied when the session was created.
    Reference(Identity),
    /// The payer's contact email entered at checkout.
    PayerContact(Identity),
    /// Nothing usable was delivered.
    Unknown,
}

impl ResolvedIdentity {
    /// Returns the identity to record; `Unknown` becomes the sentinel.
    pub fn into_identity(self) -> Identity {
        match self {
            Self::Reference(identity) | Self::PayerContact(identity) => identity,
            Self::Unknown => Identity::unknown(),
        }
    }
}

impl CheckoutSessionObject {
    /// Resolves the purchaser identity.
    ///
    /// Order: `client_reference_id`, `customer_details.email`,
    /// `customer_email`. Blank values count as absent.
    pub fn purchaser_identity(&self) -> ResolvedIdentity {
        if let Some(identity) = Identity::from_optional(self.client_reference_id.as_deref()) {
            return ResolvedIdentity::Reference(identity);
        }

        let details_email = self
            .customer_details
            .as_ref()
            .and_then(|details| details.email.as_deref());

        Identity::from_optional(details_email)
            .or_else(|| Identity::from_optional(self.customer_email.as_deref()))
            .map(ResolvedIdentity::PayerContact)
            .unwrap_or(ResolvedIdentity::Unknown)
    }

    /// Returns the embedded line items, if the session was expanded.
    pub fn embedded_line_items(&self) -> Option<&[LineItem]> {
        self.line_items
            .as_ref()
            .map(|list| list.data.as_slice())
            .filter(|items| !items.is_empty())
    }

    /// Returns the first non-blank plan hint from session metadata.
    pub fn metadata_plan_hint(&self) -> Option<PlanLabel> {
        PLAN_HINT_METADATA_KEYS
            .iter()
            .filter_map(|key| self.metadata.get(*key))
            .find(|value| !value.trim().is_empty())
            .map(PlanLabel::new)
    }
}

impl LineItem {
    /// Builds a label when the product name is known without another lookup.
    pub fn embedded_label(&self) -> Option<PlanLabel> {
        let price = self.price.as_ref();
        let recurring = price.and_then(|p| p.recurring.as_ref());

        let name = price
            .and_then(|p| match &p.product {
                Some(ExpandableProduct::Object(product)) => product.name.clone(),
                _ => None,
            })
            .or_else(|| self.description.clone())
            .or_else(|| price.and_then(|p| p.nickname.clone()))
            .filter(|name| !name.trim().is_empty())?;

        Some(PlanLabel::from_parts(
            &name,
            recurring.and_then(|r| r.interval.as_deref()),
            recurring.and_then(|r| r.interval_count),
        ))
    }

    /// Returns the product id when the product was not expanded.
    pub fn product_id(&self) -> Option<&str> {
        match self.price.as_ref()?.product.as_ref()? {
            ExpandableProduct::Id(id) => Some(id.as_str()),
            ExpandableProduct::Object(product) if !product.id.is_empty() => Some(product.id.as_str()),
            ExpandableProduct::Object(_) => None,
        }
    }

    /// Returns the price's recurring configuration, if any.
    pub fn recurring(&self) -> Option<&Recurring> {
        self.price.as_ref()?.recurring.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::UNKNOWN_IDENTITY;
    use serde_json::json;

    fn session(value: serde_json::Value) -> CheckoutSessionObject {
        serde_json::from_value(value).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Identity Resolution Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn reference_wins_over_payer_contact() {
        let s = session(json!({
            "id": "cs_1",
            "client_reference_id": "Ref@Example.com",
            "customer_details": { "email": "payer@example.com" },
            "customer_email": "other@example.com"
        }));

        assert_eq!(
            s.purchaser_identity(),
            ResolvedIdentity::Reference(Identity::parse("ref@example.com").unwrap())
        );
    }

    #[test]
    fn customer_details_email_used_when_reference_blank() {
        let s = session(json!({
            "client_reference_id": "   ",
            "customer_details": { "email": "Payer@Example.com" },
            "customer_email": "other@example.com"
        }));

        assert_eq!(s.purchaser_identity().into_identity().as_str(), "payer@example.com");
    }

    #[test]
    fn customer_email_is_last_resort() {
        let s = session(json!({
            "client_reference_id": null,
            "customer_details": { "email": null },
            "customer_email": "Last@Example.com"
        }));

        assert!(matches!(s.purchaser_identity(), ResolvedIdentity::PayerContact(_)));
        assert_eq!(s.purchaser_identity().into_identity().as_str(), "last@example.com");
    }

    #[test]
    fn nothing_usable_resolves_to_unknown() {
        let s = session(json!({ "id": "cs_1" }));

        assert_eq!(s.purchaser_identity(), ResolvedIdentity::Unknown);
        let identity = s.purchaser_identity().into_identity();
        assert!(identity.is_unknown());
        assert_eq!(identity.as_str(), UNKNOWN_IDENTITY);
    }

    #[test]
    fn empty_object_deserializes() {
        let s = session(json!({}));
        assert!(s.id.is_empty());
        assert!(s.embedded_line_items().is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Plan Hint Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn metadata_hint_prefers_plan_label_key() {
        let s = session(json!({
            "metadata": { "plan_id": "price_123", "plan_label": "Pro (monthly)" }
        }));

        assert_eq!(s.metadata_plan_hint().unwrap().as_str(), "Pro (monthly)");
    }

    #[test]
    fn metadata_hint_skips_blank_values() {
        let s = session(json!({
            "metadata": { "plan_label": " ", "plan_id": "price_123" }
        }));

        assert_eq!(s.metadata_plan_hint().unwrap().as_str(), "price_123");
    }

    #[test]
    fn metadata_hint_absent_without_keys() {
        let s = session(json!({ "metadata": { "other": "x" } }));
        assert!(s.metadata_plan_hint().is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Line Item Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn expanded_product_produces_label() {
        let item: LineItem = serde_json::from_value(json!({
            "description": "ignored when product name present",
            "price": {
                "id": "price_1",
                "product": { "id": "prod_1", "name": "Pro" },
                "recurring": { "interval": "month", "interval_count": 1 }
            }
        }))
        .unwrap();

        assert_eq!(item.embedded_label().unwrap().as_str(), "Pro (monthly)");
        assert_eq!(item.product_id(), Some("prod_1"));
    }

    #[test]
    fn unexpanded_product_falls_back_to_description() {
        let item: LineItem = serde_json::from_value(json!({
            "description": "Team",
            "price": {
                "product": "prod_2",
                "recurring": { "interval": "year" }
            }
        }))
        .unwrap();

        assert_eq!(item.embedded_label().unwrap().as_str(), "Team (yearly)");
        assert_eq!(item.product_id(), Some("prod_2"));
    }

    #[test]
    fn item_without_any_name_has_no_embedded_label() {
        let item: LineItem = serde_json::from_value(json!({
            "price": { "product": "prod_3" }
        }))
        .unwrap();

        assert!(item.embedded_label().is_none());
        assert_eq!(item.product_id(), Some("prod_3"));
    }

    #[test]
    fn embedded_line_items_ignores_empty_list() {
        let s = session(json!({ "line_items": { "data": [] } }));
        assert!(s.embedded_line_items().is_none());
    }
}
