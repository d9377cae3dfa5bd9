//! Client for the external payment pre-validation service, including the
//! OAuth2 token lifecycle (JWT-bearer grant, refresh, revocation).

mod client;
mod token;

pub use client::{
    BeneficiaryAccountDetails, MatchResult, PartyAgentDetails, PreValidationClient,
};
pub use token::TokenCache;

#[cfg(test)]
pub(crate) use token::TEST_SIGNING_KEY;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreValidationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },
    #[error("pre-validation endpoint returned {status}: {body}")]
    EndpointRejected { status: u16, body: String },
    #[error("invalid response from pre-validation service: {0}")]
    InvalidResponse(String),
    #[error("circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
    #[error("no signing key configured for JWT-bearer assertions")]
    MissingSigningKey,
    #[error("signing key rejected: {0}")]
    InvalidSigningKey(String),
}
