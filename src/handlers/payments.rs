use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Actor, Transaction, TransactionStatus};
use crate::error::AppError;
use crate::ports::Page;
use crate::services::workflow::PaymentRequest;
use crate::validation::ValidationError;
use crate::AppState;

#[derive(Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
}

impl Pagination {
    pub fn page(&self) -> Page {
        Page {
            limit: self.limit.unwrap_or(20),
            offset: self.offset.unwrap_or(0),
        }
    }

    pub fn status_filter(&self) -> Result<Option<TransactionStatus>, AppError> {
        self.status
            .as_deref()
            .map(|raw| {
                TransactionStatus::from_str(raw)
                    .map_err(|e| AppError::Validation(vec![ValidationError::new("status", e)]))
            })
            .transpose()
    }
}

#[derive(Serialize)]
pub struct PaymentList {
    pub items: Vec<Transaction>,
    pub total: i64,
}

pub async fn create_payment(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<PaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.workflow.create_payment(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn get_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.workflow.get_payment(&actor, id).await?;
    Ok(Json(tx))
}

pub async fn list_payments(
    State(state): State<AppState>,
    actor: Actor,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let status = pagination.status_filter()?;
    let (items, total) = state
        .workflow
        .list_payments(&actor, status, pagination.page())
        .await?;

    Ok(Json(PaymentList { items, total }))
}
