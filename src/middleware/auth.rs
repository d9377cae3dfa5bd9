//! Actor extraction from the trusted session headers set by the upstream
//! authentication gateway. The core does not verify credentials itself.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Actor, Role};
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = required_header(parts, USER_ID_HEADER)?;
        let id = Uuid::parse_str(&id)
            .map_err(|_| AppError::Unauthorized(format!("{} is not a valid id", USER_ID_HEADER)))?;

        let role = required_header(parts, USER_ROLE_HEADER)?;
        let role = Role::from_str(&role).map_err(AppError::Unauthorized)?;

        Ok(Actor::new(id, role))
    }
}

fn required_header(parts: &Parts, name: &str) -> Result<String, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized(format!("{} header missing", name)))
}
