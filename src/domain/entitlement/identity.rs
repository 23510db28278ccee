//! Purchaser identity value object.
//!
//! An `Identity` is always stored in normalized form (surrounding whitespace
//! trimmed, lower-cased), so every store operation keyed by it is
//! case-insensitive without callers having to remember to normalize.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Sentinel used when a purchase event carries no usable identity.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Normalized purchaser identity (usually an email address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalizes and wraps a raw identity string.
    ///
    /// The value is not validated as an email; the payment provider owns that.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` when the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("identity"));
        }
        Ok(Self(normalized))
    }

    /// Normalizes an optional raw value, treating blanks as absent.
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::parse(value).ok())
    }

    /// The sentinel recorded for purchases that arrive without an identity.
    pub fn unknown() -> Self {
        Self(UNKNOWN_IDENTITY.to_string())
    }

    /// Returns the normalized identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the `unknown` sentinel.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_IDENTITY
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
