//! Entitlement error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UpstreamRequestFailed | 500 |
//! | StoreReadFailed | 500 |
//! | StoreWriteFailed | 200 (webhook still acknowledged) |
//! | PlanResolutionFailed | never surfaced |
//! | ServiceUnavailable | 503 |

use crate::domain::foundation::{DomainError, ErrorCode};

/// Entitlement-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    /// The payment provider rejected or never answered a request.
    UpstreamRequestFailed(String),

    /// Writing to the entitlement store failed.
    StoreWriteFailed(String),

    /// Reading from the entitlement store failed.
    StoreReadFailed(String),

    /// The plan label could not be looked up; a fallback is used.
    PlanResolutionFailed(String),

    /// The store is not connected yet.
    ServiceUnavailable,
}

impl EntitlementError {
    pub fn upstream(message: impl Into<String>) -> Self {
        EntitlementError::UpstreamRequestFailed(message.into())
    }

    pub fn store_write(message: impl Into<String>) -> Self {
        EntitlementError::StoreWriteFailed(message.into())
    }

    pub fn store_read(message: impl Into<String>) -> Self {
        EntitlementError::StoreReadFailed(message.into())
    }

    pub fn plan_resolution(message: impl Into<String>) -> Self {
        EntitlementError::PlanResolutionFailed(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EntitlementError::UpstreamRequestFailed(_)
            | EntitlementError::PlanResolutionFailed(_) => ErrorCode::ExternalServiceError,
            EntitlementError::StoreWriteFailed(_) | EntitlementError::StoreReadFailed(_) => {
                ErrorCode::DatabaseError
            }
            EntitlementError::ServiceUnavailable => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            EntitlementError::UpstreamRequestFailed(msg) => msg.clone(),
            EntitlementError::StoreWriteFailed(msg) => {
                format!("Failed to record entitlement: {}", msg)
            }
            EntitlementError::StoreReadFailed(msg) => {
                format!("Failed to read entitlement: {}", msg)
            }
            EntitlementError::PlanResolutionFailed(msg) => {
                format!("Failed to resolve plan label: {}", msg)
            }
            EntitlementError::ServiceUnavailable => "Entitlement store is not ready".to_string(),
        }
    }
}

impl std::fmt::Display for EntitlementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for EntitlementError {}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DatabaseError => EntitlementError::StoreWriteFailed(err.message),
            _ => EntitlementError::UpstreamRequestFailed(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_passed_through_verbatim() {
        let err = EntitlementError::upstream("No such price: 'price_x'");
        assert_eq!(err.to_string(), "No such price: 'price_x'");
        assert_eq!(err.code(), ErrorCode::ExternalServiceError);
    }

    #[test]
    fn store_errors_map_to_database_code() {
        assert_eq!(
            EntitlementError::store_write("x").code(),
            ErrorCode::DatabaseError
        );
        assert_eq!(
            EntitlementError::store_read("x").code(),
            ErrorCode::DatabaseError
        );
    }

    #[test]
    fn service_unavailable_message() {
        assert_eq!(
            EntitlementError::ServiceUnavailable.to_string(),
            "Entitlement store is not ready"
        );
    }

    #[test]
    fn domain_database_error_converts_to_store_write() {
        let err: EntitlementError = DomainError::database("pool timed out").into();
        assert_eq!(err, EntitlementError::StoreWriteFailed("pool timed out".to_string()));
    }
}
