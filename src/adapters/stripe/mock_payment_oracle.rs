//! Mock payment oracle for testing.
//!
//! Provides a configurable implementation of `PaymentOracle` for unit and
//! integration tests. Supports:
//! - Pre-configured checkout sessions, line items and products
//! - Error injection per method
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::entitlement::{LineItem, ProductObject};
use crate::ports::{CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentOracle};

/// Mock payment oracle for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentOracle::new();
/// mock.set_line_items("cs_123", vec![line_item]);
/// mock.fail_method("retrieve_product", PaymentError::network("down"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentOracle {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Line items by session id.
    line_items: HashMap<String, Vec<LineItem>>,

    /// Products by id.
    products: HashMap<String, ProductObject>,

    /// Session URL to hand back from `create_checkout_session`.
    checkout_url: Option<String>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Checkout requests received.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    next_session_seq: u32,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentOracle {
    /// Create a new mock oracle with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the line items returned for a session.
    pub fn set_line_items(&self, session_id: impl Into<String>, items: Vec<LineItem>) {
        self.state().line_items.insert(session_id.into(), items);
    }

    /// Register a product for `retrieve_product`.
    pub fn set_product(&self, product: ProductObject) {
        self.state().products.insert(product.id.clone(), product);
    }

    /// Set the hosted page URL returned with new sessions.
    pub fn set_checkout_url(&self, url: impl Into<String>) {
        self.state().checkout_url = Some(url.into());
    }

    /// Make a method fail with the given error until cleared.
    pub fn fail_method(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all injected errors.
    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    /// All recorded calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Number of calls to one method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Checkout requests received, in order.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    fn record(&self, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentOracle for MockPaymentOracle {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record(
            "create_checkout_session",
            vec![request.plan_id.clone(), request.purchaser_identity.clone()],
        )?;

        let mut state = self.state();
        state.next_session_seq += 1;
        let id = format!("cs_test_{}", state.next_session_seq);
        let url = state.checkout_url.clone();
        state.checkout_requests.push(request);

        Ok(CheckoutSession { id, url })
    }

    async fn list_line_items(&self, session_id: &str) -> Result<Vec<LineItem>, PaymentError> {
        self.record("list_line_items", vec![session_id.to_string()])?;
        Ok(self
            .state()
            .line_items
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve_product(&self, product_id: &str) -> Result<ProductObject, PaymentError> {
        self.record("retrieve_product", vec![product_id.to_string()])?;
        self.state()
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Product"))
    }
}
