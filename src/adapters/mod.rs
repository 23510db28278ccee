//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes and handlers
//! - `memory` - In-memory stores for tests and database-less runs
//! - `postgres` - PostgreSQL stores
//! - `stripe` - Stripe REST client and a scriptable mock

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
