//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, timestamps)
//! - `entitlement` - Identities, plan labels, Stripe events, and webhook verification

pub mod entitlement;
pub mod foundation;
