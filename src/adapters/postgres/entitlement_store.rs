//! PostgreSQL implementation of EntitlementStore.
//!
//! Insert-if-absent is a single `INSERT ... ON CONFLICT DO NOTHING RETURNING`
//! statement, so concurrent deliveries are serialized by the primary key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{EntitlementRecord, Identity, PlanLabel};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{EntitlementStore, InsertOutcome, RemoveOutcome};

/// PostgreSQL implementation of the EntitlementStore port.
pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an entitlement.
#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    identity: String,
    plan_label: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for EntitlementRecord {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        let identity = Identity::parse(&row.identity).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid identity: {}", e))
        })?;

        Ok(EntitlementRecord::reconstitute(
            identity,
            PlanLabel::new(row.plan_label),
            Timestamp::from_datetime(row.recorded_at),
        ))
    }
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn insert(
        &self,
        identity: &Identity,
        plan_label: &PlanLabel,
    ) -> Result<InsertOutcome, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            INSERT INTO entitlements (identity, plan_label, recorded_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (identity) DO NOTHING
            RETURNING identity, plan_label, recorded_at
            "#,
        )
        .bind(identity.as_str())
        .bind(plan_label.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert entitlement: {}", e))
        })?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(EntitlementRecord::try_from(row)?)),
            None => Ok(InsertOutcome::AlreadyPresent),
        }
    }

    async fn remove(&self, identity: &Identity) -> Result<RemoveOutcome, DomainError> {
        let result = sqlx::query("DELETE FROM entitlements WHERE identity = $1")
            .bind(identity.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to remove entitlement: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Ok(RemoveOutcome::NotPresent);
        }
        Ok(RemoveOutcome::Removed)
    }

    async fn exists(&self, identity: &Identity) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM entitlements WHERE identity = $1)")
                .bind(identity.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Failed to check entitlement: {}", e))
                })?;

        Ok(exists)
    }

    async fn find(&self, identity: &Identity) -> Result<Option<EntitlementRecord>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            SELECT identity, plan_label, recorded_at
            FROM entitlements
            WHERE identity = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find entitlement: {}", e))
        })?;

        row.map(EntitlementRecord::try_from).transpose()
    }
}
