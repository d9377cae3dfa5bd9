use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::{PreValidationError, TokenCache};
use crate::config::PreValidationConfig;

/// Match indicator the service uses for a positive result.
pub const MATCH_POSITIVE: &str = "MTCH";

const ACCOUNT_VERIFY_PATH: &str = "/v1/beneficiary-accounts/verify";
const DATA_PROVIDER_PATH: &str = "/v1/data-providers/validate";

/// Beneficiary details sent to the account-verification endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryAccountDetails {
    pub account_number: String,
    pub agent_bic: String,
    pub payee_name: String,
}

/// Routing-agent details sent to the data-provider check.
#[derive(Debug, Clone, Serialize)]
pub struct PartyAgentDetails {
    pub agent_bic: String,
}

/// Outcome of a pre-validation check. A negative match is a successful call;
/// only transport, auth and protocol failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    match_indicator: String,
    #[serde(default)]
    reason: Option<String>,
}

/// HTTP client for the external pre-validation API.
#[derive(Clone)]
pub struct PreValidationClient {
    client: Client,
    base_url: String,
    tokens: TokenCache,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl PreValidationClient {
    pub fn new(config: &PreValidationConfig) -> Result<Self, PreValidationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        let tokens = TokenCache::new(client.clone(), config.clone())?;

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Ok(PreValidationClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            circuit_breaker,
        })
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Checks that the payee account exists and belongs to the named payee.
    pub async fn verify_beneficiary_account(
        &self,
        details: &BeneficiaryAccountDetails,
        subject_dn: &str,
    ) -> Result<MatchResult, PreValidationError> {
        self.post_check(ACCOUNT_VERIFY_PATH, details, subject_dn)
            .await
    }

    /// Checks that the payee's routing agent is a recognized data provider.
    pub async fn validate_data_provider(
        &self,
        details: &PartyAgentDetails,
        subject_dn: &str,
    ) -> Result<MatchResult, PreValidationError> {
        self.post_check(DATA_PROVIDER_PATH, details, subject_dn)
            .await
    }

    async fn post_check<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        subject_dn: &str,
    ) -> Result<MatchResult, PreValidationError> {
        let token = self.tokens.get_valid_token(subject_dn).await?;
        let url = format!("{}{}", self.base_url, path);
        // Fresh correlation id per call, never reused across retries.
        let correlation_id = Uuid::new_v4().to_string();
        let payload =
            serde_json::to_value(body).map_err(|e| PreValidationError::InvalidResponse(e.to_string()))?;

        let client = self.client.clone();
        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&token)
                    .header("X-Request-Id", &correlation_id)
                    .json(&payload)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PreValidationError::EndpointRejected {
                        status: status.as_u16(),
                        body,
                    });
                }

                let check: CheckResponse = response
                    .json()
                    .await
                    .map_err(|e| PreValidationError::InvalidResponse(e.to_string()))?;

                Ok(MatchResult {
                    matched: check.match_indicator == MATCH_POSITIVE,
                    reason: check.reason,
                })
            })
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(FailsafeError::Rejected) => Err(PreValidationError::CircuitBreakerOpen(
                "pre-validation circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prevalidation::token::{JWT_BEARER_GRANT, TEST_SIGNING_KEY};

    const UUID_PATTERN: &str =
        "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

    fn test_config(base_url: &str) -> PreValidationConfig {
        PreValidationConfig {
            base_url: base_url.to_string(),
            token_url: format!("{}/oauth2/token", base_url),
            revoke_url: format!("{}/oauth2/revoke", base_url),
            consumer_key: "swiftgate-consumer".to_string(),
            signing_key_pem: TEST_SIGNING_KEY.to_string(),
            signing_cert_chain: vec![],
            signing_subject_dn: Some("cn=swiftgate,o=bank,l=za".to_string()),
            timeout_secs: 5,
        }
    }

    async fn mock_token_endpoint(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/oauth2/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                JWT_BEARER_GRANT.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"token-1","refresh_token":null,"expires_in":3600}"#)
            .create_async()
            .await
    }

    fn account_details() -> BeneficiaryAccountDetails {
        BeneficiaryAccountDetails {
            account_number: "PAYEE123".to_string(),
            agent_bic: "SBZAZAJJ".to_string(),
            payee_name: "Jane Smith".to_string(),
        }
    }

    #[tokio::test]
    async fn account_verification_reports_positive_match() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let mock = server
            .mock("POST", ACCOUNT_VERIFY_PATH)
            .match_header("authorization", "Bearer token-1")
            .match_header(
                "x-request-id",
                mockito::Matcher::Regex(UUID_PATTERN.into()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"match_indicator":"MTCH"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .verify_beneficiary_account(&account_details(), "cn=swiftgate")
            .await
            .unwrap();

        assert!(result.matched);
        assert!(result.reason.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn account_verification_reports_negative_match_with_reason() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let _mock = server
            .mock("POST", ACCOUNT_VERIFY_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"match_indicator":"NMTC","reason":"account closed"}"#)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .verify_beneficiary_account(&account_details(), "cn=swiftgate")
            .await
            .unwrap();

        assert!(!result.matched);
        assert_eq!(result.reason.as_deref(), Some("account closed"));
    }

    #[tokio::test]
    async fn data_provider_check_hits_its_own_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let mock = server
            .mock("POST", DATA_PROVIDER_PATH)
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"agent_bic": "SBZAZAJJ"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"match_indicator":"MTCH"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .validate_data_provider(
                &PartyAgentDetails {
                    agent_bic: "SBZAZAJJ".to_string(),
                },
                "cn=swiftgate",
            )
            .await
            .unwrap();

        assert!(result.matched);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_response_passes_error_body_through() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let _mock = server
            .mock("POST", ACCOUNT_VERIFY_PATH)
            .with_status(500)
            .with_body(r#"{"fault":"internal"}"#)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .verify_beneficiary_account(&account_details(), "cn=swiftgate")
            .await;

        match result {
            Err(PreValidationError::EndpointRejected { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("internal"));
            }
            other => panic!("expected EndpointRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_response_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let _mock = server
            .mock("POST", ACCOUNT_VERIFY_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected":"shape"}"#)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .verify_beneficiary_account(&account_details(), "cn=swiftgate")
            .await;

        assert!(matches!(
            result,
            Err(PreValidationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn circuit_breaker_opens_after_consecutive_failures() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token_endpoint(&mut server).await;
        let _mock = server
            .mock("POST", ACCOUNT_VERIFY_PATH)
            .with_status(500)
            .expect_at_least(3)
            .create_async()
            .await;

        let client = PreValidationClient::new(&test_config(&server.url())).unwrap();
        for _ in 0..3 {
            let _ = client
                .verify_beneficiary_account(&account_details(), "cn=swiftgate")
                .await;
        }

        let result = client
            .verify_beneficiary_account(&account_details(), "cn=swiftgate")
            .await;
        assert!(matches!(
            result,
            Err(PreValidationError::CircuitBreakerOpen(_))
        ));
    }
}
