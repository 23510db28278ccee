//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types shared by every layer
//! of the relay.

mod errors;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use timestamp::Timestamp;
