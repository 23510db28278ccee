//! PostgreSQL implementation of WebhookEventLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{SaveResult, WebhookEventLog, WebhookEventRecord, WebhookOutcome};

/// PostgreSQL implementation of the WebhookEventLog port.
pub struct PostgresWebhookEventLog {
    pool: PgPool,
}

impl PostgresWebhookEventLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    outcome: String,
    identity: Option<String>,
    detail: Option<String>,
    payload: serde_json::Value,
    processed_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            outcome: parse_outcome(&row.outcome)?,
            identity: row.identity,
            detail: row.detail,
            payload: row.payload,
            processed_at: row.processed_at,
        })
    }
}

fn parse_outcome(s: &str) -> Result<WebhookOutcome, DomainError> {
    match s {
        "recorded" => Ok(WebhookOutcome::Recorded),
        "already_entitled" => Ok(WebhookOutcome::AlreadyEntitled),
        "ignored" => Ok(WebhookOutcome::Ignored),
        "failed" => Ok(WebhookOutcome::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid outcome value: {}", s),
        )),
    }
}

#[async_trait]
impl WebhookEventLog for PostgresWebhookEventLog {
    async fn append(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        // xmax is zero only for a freshly inserted tuple.
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO webhook_events (
                event_id, event_type, outcome, identity, detail, payload, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (event_id) DO UPDATE SET
                outcome = EXCLUDED.outcome,
                identity = EXCLUDED.identity,
                detail = EXCLUDED.detail,
                payload = EXCLUDED.payload,
                processed_at = EXCLUDED.processed_at
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.outcome.as_str())
        .bind(&record.identity)
        .bind(&record.detail)
        .bind(&record.payload)
        .bind(record.processed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save webhook event: {}", e))
        })?;

        if inserted {
            Ok(SaveResult::Inserted)
        } else {
            Ok(SaveResult::Replaced)
        }
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, outcome, identity, detail, payload, processed_at
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find webhook event: {}", e))
        })?;

        row.map(WebhookEventRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_outcome_accepts_every_stored_value() {
        for outcome in [
            WebhookOutcome::Recorded,
            WebhookOutcome::AlreadyEntitled,
            WebhookOutcome::Ignored,
            WebhookOutcome::Failed,
        ] {
            assert_eq!(parse_outcome(outcome.as_str()).unwrap(), outcome);
        }
    }

    #[test]
    fn parse_outcome_rejects_unknown_values() {
        assert!(parse_outcome("success").is_err());
        assert!(parse_outcome("").is_err());
    }
}
