//! The entitlement record: existence means the identity is entitled.

use serde::{Deserialize, Serialize};

use super::{Identity, PlanLabel};
use crate::domain::foundation::Timestamp;

/// A single allowlist entry.
///
/// Records are never mutated after insertion. Revocation deletes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    pub identity: Identity,
    pub plan_label: PlanLabel,
    pub recorded_at: Timestamp,
}

impl EntitlementRecord {
    /// Creates a record stamped with the current time.
    pub fn new(identity: Identity, plan_label: PlanLabel) -> Self {
        Self {
            identity,
            plan_label,
            recorded_at: Timestamp::now(),
        }
    }

    /// Reconstitutes a record loaded from storage.
    pub fn reconstitute(identity: Identity, plan_label: PlanLabel, recorded_at: Timestamp) -> Self {
        Self {
            identity,
            plan_label,
            recorded_at,
        }
    }
}
