//! Transaction domain entity.
//! Framework-agnostic representation of an outbound SWIFT payment.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::NormalizedPayment;

/// Payment lifecycle status.
///
/// Allowed transitions: `pending -> verified`, `pending -> rejected`,
/// `verified -> completed`. Everything else is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Verified,
    Rejected,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Verified => "verified",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Verified)
                | (TransactionStatus::Pending, TransactionStatus::Rejected)
                | (TransactionStatus::Verified, TransactionStatus::Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Rejected | TransactionStatus::Completed
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "verified" => Ok(TransactionStatus::Verified),
            "rejected" => Ok(TransactionStatus::Rejected),
            "completed" => Ok(TransactionStatus::Completed),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// Domain entity representing a payment. Amount, currency and payee fields
/// are immutable after creation; only status, notes and the submission
/// reference change over the lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: BigDecimal,
    pub currency: String,
    pub payee_account: String,
    pub swift_code: String,
    pub payee_name: String,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub submission_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(customer_id: Uuid, payment: NormalizedPayment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            amount: payment.amount,
            currency: payment.currency,
            payee_account: payment.payee_account,
            swift_code: payment.swift_code,
            payee_name: payment.payee_name,
            status: TransactionStatus::Pending,
            notes: None,
            submission_ref: None,
            created_at: now,
            updated_at: now,
        }
    }
}
