use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::PreValidationError;
use crate::config::PreValidationConfig;

/// A token this close to expiry is treated as already expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;
/// Lifetime of a signed JWT-bearer assertion.
pub const ASSERTION_TTL_SECS: i64 = 300;
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(EXPIRY_SKEW_SECS)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    sub: &'a str,
    jti: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Process-wide cache for the single access/refresh token pair issued by the
/// pre-validation service. Acquisition is serialized through an async mutex:
/// callers that arrive while a grant is in flight wait on the lock and then
/// observe the token it stored, instead of issuing a duplicate request.
#[derive(Clone)]
pub struct TokenCache {
    http: Client,
    config: PreValidationConfig,
    encoding_key: Arc<EncodingKey>,
    state: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    pub fn new(http: Client, config: PreValidationConfig) -> Result<Self, PreValidationError> {
        if config.signing_key_pem.trim().is_empty() {
            return Err(PreValidationError::MissingSigningKey);
        }

        let encoding_key = EncodingKey::from_rsa_pem(config.signing_key_pem.as_bytes())
            .map_err(|e| PreValidationError::InvalidSigningKey(e.to_string()))?;

        Ok(Self {
            http,
            config,
            encoding_key: Arc::new(encoding_key),
            state: Arc::new(Mutex::new(None)),
        })
    }

    /// Returns a live access token, acquiring or refreshing one if the cached
    /// token is absent or expires within [`EXPIRY_SKEW_SECS`].
    pub async fn get_valid_token(&self, subject_dn: &str) -> Result<String, PreValidationError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if !token.is_expiring(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        // Prefer the refresh grant when a refresh token is held, but an
        // expired refresh token must not strand the caller.
        let refreshed = match state.as_ref().and_then(|t| t.refresh_token.clone()) {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!(error = %e, "refresh grant failed, requesting a new token");
                    None
                }
            },
            None => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => self.request_with_assertion(subject_dn).await?,
        };

        let access_token = token.access_token.clone();
        *state = Some(token);
        Ok(access_token)
    }

    /// Revokes the held token. The revocation call is best-effort; the cache
    /// is cleared regardless of its outcome.
    pub async fn revoke(&self) {
        let mut state = self.state.lock().await;
        let Some(token) = state.take() else {
            return;
        };

        let params = [("token", token.access_token.as_str())];
        match self
            .http
            .post(&self.config.revoke_url)
            .form(&params)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!("access token revoked");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "revocation endpoint rejected token");
            }
            Err(e) => {
                tracing::warn!(error = %e, "revocation request failed");
            }
        }
    }

    fn sign_assertion(&self, subject_dn: &str) -> Result<String, PreValidationError> {
        let mut header = Header::new(Algorithm::RS256);
        if !self.config.signing_cert_chain.is_empty() {
            header.x5c = Some(self.config.signing_cert_chain.clone());
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.config.consumer_key,
            aud: &self.config.token_url,
            sub: subject_dn,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: now.timestamp() + ASSERTION_TTL_SECS,
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| PreValidationError::InvalidSigningKey(e.to_string()))
    }

    async fn request_with_assertion(
        &self,
        subject_dn: &str,
    ) -> Result<CachedToken, PreValidationError> {
        let assertion = self.sign_assertion(subject_dn)?;
        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ];
        self.token_request(&params).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<CachedToken, PreValidationError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.token_request(&params).await
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<CachedToken, PreValidationError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PreValidationError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PreValidationError::InvalidResponse(e.to_string()))?;

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }

    #[cfg(test)]
    async fn seed(&self, access_token: &str, refresh_token: Option<&str>, expires_in_secs: i64) {
        let mut state = self.state.lock().await;
        *state = Some(CachedToken {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        });
    }
}

#[cfg(test)]
pub(crate) const TEST_SIGNING_KEY: &str = include_str!("../../tests/fixtures/test_signing_key.pem");
