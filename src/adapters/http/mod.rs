//! HTTP adapters - REST API implementations.

pub mod entitlement;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

// Re-export key types for convenience
pub use entitlement::entitlement_router;
pub use entitlement::EntitlementAppState;

/// Assemble the full application: routes, state, and the tower-http stack.
pub fn build_app(state: EntitlementAppState, server: &ServerConfig) -> Router {
    entitlement_router()
        .with_state(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

/// Configured origins win. With none configured, development is permissive
/// and every other environment allows no cross-origin callers.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if server.is_development() {
            return CorsLayer::permissive();
        }
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
