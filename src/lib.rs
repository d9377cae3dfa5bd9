pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod prevalidation;
pub mod services;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::services::workflow::TransactionWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<TransactionWorkflow>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/payments",
            post(handlers::payments::create_payment).get(handlers::payments::list_payments),
        )
        .route("/payments/:id", get(handlers::payments::get_payment))
        .route("/review/pending", get(handlers::review::list_pending))
        .route("/review/:id/verify", post(handlers::review::verify))
        .route("/review/:id/reject", post(handlers::review::reject))
        .route("/review/:id/submit", post(handlers::review::submit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
