//! Entitlement Relay - Stripe checkout and webhook relay.
//!
//! Starts hosted subscription checkouts, turns verified
//! `checkout.session.completed` webhooks into allowlist entries, and answers
//! "is this identity entitled?" for the rest of the product.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
