//! Human-readable plan description stored alongside an entitlement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used when nothing better can be resolved.
pub const PLACEHOLDER_PLAN_LABEL: &str = "Subscription";

/// Best-effort description of the purchased plan, e.g. `Pro (monthly)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanLabel(String);

impl PlanLabel {
    /// Creates a label from free text, falling back to the placeholder when blank.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            Self::placeholder()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the generic `Subscription` label.
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_PLAN_LABEL.to_string())
    }

    /// Builds a label from a product name and its billing interval.
    ///
    /// `interval` is the oracle's recurring interval (`day`, `week`, `month`,
    /// `year`). Counts above one render as `every N months`.
    pub fn from_parts(product_name: &str, interval: Option<&str>, interval_count: Option<u32>) -> Self {
        let name = product_name.trim();
        if name.is_empty() {
            return Self::placeholder();
        }

        match interval.map(str::trim).filter(|i| !i.is_empty()) {
            Some(interval) => {
                let cadence = describe_interval(interval, interval_count.unwrap_or(1));
                Self(format!("{} ({})", name, cadence))
            }
            None => Self(name.to_string()),
        }
    }

    /// Returns true if this is the generic placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_PLAN_LABEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlanLabel {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for PlanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn describe_interval(interval: &str, count: u32) -> String {
    if count > 1 {
        return format!("every {} {}s", count, interval);
    }
    match interval {
        "day" => "daily".to_string(),
        "week" => "weekly".to_string(),
        "month" => "monthly".to_string(),
        "year" => "yearly".to_string(),
        other => format!("every {}", other),
    }
}
