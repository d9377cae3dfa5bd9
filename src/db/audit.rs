//! Append-only audit trail for workflow transitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::ports::AuditRecorder;

pub const ACTION_TRANSACTION_CREATED: &str = "TRANSACTION_CREATED";
pub const ACTION_TRANSACTION_VERIFIED: &str = "TRANSACTION_VERIFIED";
pub const ACTION_TRANSACTION_REJECTED: &str = "TRANSACTION_REJECTED";
pub const ACTION_SWIFT_SUBMISSION: &str = "SWIFT_SUBMISSION";

#[derive(Debug, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub transaction_id: Option<Uuid>,
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Postgres-backed audit recorder. The business transition has already
/// committed by the time an entry is recorded, so persistence failures are
/// logged and swallowed rather than propagated.
#[derive(Clone)]
pub struct PostgresAuditRecorder {
    pool: PgPool,
}

impl PostgresAuditRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn try_record(
        &self,
        actor_id: Uuid,
        action: &str,
        transaction_id: Option<Uuid>,
        detail: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (id, actor_id, action, transaction_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor_id)
        .bind(action)
        .bind(transaction_id)
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT * FROM audit_entries
            WHERE transaction_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl AuditRecorder for PostgresAuditRecorder {
    async fn record(
        &self,
        actor_id: Uuid,
        action: &str,
        transaction_id: Option<Uuid>,
        detail: serde_json::Value,
    ) {
        if let Err(e) = self
            .try_record(actor_id, action, transaction_id, &detail)
            .await
        {
            tracing::error!(
                error = %e,
                action,
                transaction_id = ?transaction_id,
                "audit entry not persisted"
            );
        }
    }
}
