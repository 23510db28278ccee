//! In-memory webhook event log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventLog, WebhookEventRecord};

/// HashMap-backed [`WebhookEventLog`] keyed by event id.
#[derive(Default)]
pub struct InMemoryWebhookEventLog {
    records: RwLock<HashMap<String, WebhookEventRecord>>,
    fail_appends: AtomicBool,
}

impl InMemoryWebhookEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent append fail.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl WebhookEventLog for InMemoryWebhookEventLog {
    async fn append(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated append failure"));
        }

        let mut records = self.records.write().await;
        match records.insert(record.event_id.clone(), record) {
            Some(_) => Ok(SaveResult::Replaced),
            None => Ok(SaveResult::Inserted),
        }
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }
}
