//! Employee-facing review operations.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::payments::{Pagination, PaymentList};
use crate::domain::{Actor, TransactionStatus};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub notes: Option<String>,
}

pub async fn list_pending(
    State(state): State<AppState>,
    actor: Actor,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let (items, total) = state
        .workflow
        .list_by_status(&actor, TransactionStatus::Pending, pagination.page())
        .await?;

    Ok(Json(PaymentList { items, total }))
}

pub async fn verify(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.workflow.pre_validate_and_verify(&actor, id).await?;
    Ok(Json(tx))
}

pub async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.workflow.reject(&actor, id, payload.notes).await?;
    Ok(Json(tx))
}

pub async fn submit(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.workflow.submit_to_network(&actor, id).await?;
    Ok(Json(tx))
}
