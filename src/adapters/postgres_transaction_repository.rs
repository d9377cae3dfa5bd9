//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::ports::{Page, RepositoryError, RepositoryResult, StatusChange, TransactionRepository};

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                id, customer_id, amount, currency, payee_account, swift_code,
                payee_name, status, notes, submission_ref, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(tx.customer_id)
        .bind(&tx.amount)
        .bind(&tx.currency)
        .bind(&tx.payee_account)
        .bind(&tx.swift_code)
        .bind(&tx.payee_name)
        .bind(tx.status.as_str())
        .bind(&tx.notes)
        .bind(&tx.submission_ref)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(id.to_string()))?
            .into_domain()
    }

    async fn list_by_customer(
        &self,
        customer_id: Uuid,
        status: Option<TransactionStatus>,
        page: Page,
    ) -> RepositoryResult<(Vec<Transaction>, i64)> {
        let status_filter = status.map(|s| s.as_str());

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(customer_id)
        .bind(status_filter)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(customer_id)
        .bind(status_filter)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let items = rows
            .into_iter()
            .map(TransactionRow::into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn list_by_status(
        &self,
        status: TransactionStatus,
        page: Page,
    ) -> RepositoryResult<(Vec<Transaction>, i64)> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(RepositoryError::from)?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.as_str())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let items = rows
            .into_iter()
            .map(TransactionRow::into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn update_status(&self, id: Uuid, change: StatusChange) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions
            SET status = $3,
                notes = COALESCE($4, notes),
                submission_ref = COALESCE($5, submission_ref),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.expected.as_str())
        .bind(change.new.as_str())
        .bind(&change.notes)
        .bind(&change.submission_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => row.into_domain(),
            // Zero rows means the guard failed; tell a missing row apart
            // from a lost race so callers get the right error.
            None => {
                let current = self.get_by_id(id).await?;
                Err(RepositoryError::Conflict(format!(
                    "transaction {} is '{}', expected '{}'",
                    id, current.status, change.expected
                )))
            }
        }
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    customer_id: Uuid,
    amount: bigdecimal::BigDecimal,
    currency: String,
    payee_account: String,
    swift_code: String,
    payee_name: String,
    status: String,
    notes: Option<String>,
    submission_ref: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let status = TransactionStatus::from_str(&self.status)
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Transaction {
            id: self.id,
            customer_id: self.customer_id,
            amount: self.amount,
            currency: self.currency,
            payee_account: self.payee_account,
            swift_code: self.swift_code,
            payee_name: self.payee_name,
            status,
            notes: self.notes,
            submission_ref: self.submission_ref,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
