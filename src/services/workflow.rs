//! Payment lifecycle orchestration: create, pre-validate, verify, reject,
//! submit. Every transition goes through the repository's compare-and-swap
//! update so two employees acting on the same payment cannot both win.

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::audit::{
    ACTION_SWIFT_SUBMISSION, ACTION_TRANSACTION_CREATED, ACTION_TRANSACTION_REJECTED,
    ACTION_TRANSACTION_VERIFIED,
};
use crate::domain::{Actor, Role, Transaction, TransactionStatus};
use crate::error::AppError;
use crate::ports::{AuditRecorder, Page, StatusChange, TransactionRepository};
use crate::prevalidation::{BeneficiaryAccountDetails, PartyAgentDetails, PreValidationClient};
use crate::validation::validate_payment;

/// Raw payment fields as submitted by a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: String,
    pub currency: String,
    pub payee_account: String,
    pub swift_code: String,
    pub payee_name: String,
}

pub struct TransactionWorkflow {
    repo: Arc<dyn TransactionRepository>,
    audit: Arc<dyn AuditRecorder>,
    client: PreValidationClient,
    transaction_ceiling: BigDecimal,
    signing_subject_dn: Option<String>,
}

impl TransactionWorkflow {
    pub fn new(
        repo: Arc<dyn TransactionRepository>,
        audit: Arc<dyn AuditRecorder>,
        client: PreValidationClient,
        transaction_ceiling: BigDecimal,
        signing_subject_dn: Option<String>,
    ) -> Self {
        Self {
            repo,
            audit,
            client,
            transaction_ceiling,
            signing_subject_dn,
        }
    }

    /// Creates a pending payment owned by the calling customer. All field
    /// failures are collected and returned together.
    pub async fn create_payment(
        &self,
        actor: &Actor,
        request: PaymentRequest,
    ) -> Result<Transaction, AppError> {
        require_role(actor, Role::Customer)?;

        let payment = validate_payment(
            &request.amount,
            &request.currency,
            &request.payee_account,
            &request.swift_code,
            &request.payee_name,
            &self.transaction_ceiling,
        )
        .map_err(AppError::Validation)?;

        let tx = Transaction::new(actor.id, payment);
        let inserted = self.repo.insert(&tx).await?;

        tracing::info!(transaction_id = %inserted.id, customer_id = %actor.id, "payment created");
        self.audit
            .record(
                actor.id,
                ACTION_TRANSACTION_CREATED,
                Some(inserted.id),
                json!({
                    "amount": inserted.amount.to_string(),
                    "currency": inserted.currency,
                    "payee_account": inserted.payee_account,
                    "swift_code": inserted.swift_code,
                }),
            )
            .await;

        Ok(inserted)
    }

    pub async fn get_payment(&self, actor: &Actor, id: Uuid) -> Result<Transaction, AppError> {
        let tx = self.repo.get_by_id(id).await?;

        // Customers only see their own payments; an id they do not own is
        // indistinguishable from an unknown one.
        if actor.role == Role::Customer && tx.customer_id != actor.id {
            return Err(AppError::NotFound(id.to_string()));
        }

        Ok(tx)
    }

    pub async fn list_payments(
        &self,
        actor: &Actor,
        status: Option<TransactionStatus>,
        page: Page,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        require_role(actor, Role::Customer)?;
        Ok(self.repo.list_by_customer(actor.id, status, page).await?)
    }

    pub async fn list_by_status(
        &self,
        actor: &Actor,
        status: TransactionStatus,
        page: Page,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        require_role(actor, Role::Employee)?;
        Ok(self.repo.list_by_status(status, page).await?)
    }

    /// Runs both external pre-validation checks and settles the payment into
    /// `verified` or `rejected`. A transport or auth failure from the
    /// external service leaves the payment `pending`.
    pub async fn pre_validate_and_verify(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Transaction, AppError> {
        require_role(actor, Role::Employee)?;

        let tx = self.repo.get_by_id(id).await?;
        require_status(&tx, TransactionStatus::Pending)?;

        let subject_dn = self.signing_subject_dn.as_deref().ok_or_else(|| {
            AppError::Configuration("signing subject DN is not configured".to_string())
        })?;

        let account_check = self
            .client
            .verify_beneficiary_account(
                &BeneficiaryAccountDetails {
                    account_number: tx.payee_account.clone(),
                    agent_bic: tx.swift_code.clone(),
                    payee_name: tx.payee_name.clone(),
                },
                subject_dn,
            )
            .await?;

        let provider_check = self
            .client
            .validate_data_provider(
                &PartyAgentDetails {
                    agent_bic: tx.swift_code.clone(),
                },
                subject_dn,
            )
            .await?;

        if account_check.matched && provider_check.matched {
            let updated = self
                .repo
                .update_status(
                    id,
                    StatusChange {
                        expected: TransactionStatus::Pending,
                        new: TransactionStatus::Verified,
                        notes: None,
                        submission_ref: None,
                    },
                )
                .await?;

            tracing::info!(transaction_id = %id, "payment verified");
            self.audit
                .record(
                    actor.id,
                    ACTION_TRANSACTION_VERIFIED,
                    Some(id),
                    json!({
                        "account_verification": "match",
                        "data_provider": "match",
                    }),
                )
                .await;

            return Ok(updated);
        }

        let mut failed_checks = Vec::new();
        if !account_check.matched {
            failed_checks.push(named_failure("account_verification", &account_check.reason));
        }
        if !provider_check.matched {
            failed_checks.push(named_failure("data_provider", &provider_check.reason));
        }
        let notes = format!("pre-validation failed: {}", failed_checks.join("; "));

        let updated = self
            .repo
            .update_status(
                id,
                StatusChange {
                    expected: TransactionStatus::Pending,
                    new: TransactionStatus::Rejected,
                    notes: Some(notes),
                    submission_ref: None,
                },
            )
            .await?;

        tracing::warn!(transaction_id = %id, checks = ?failed_checks, "pre-validation rejected payment");
        self.audit
            .record(
                actor.id,
                ACTION_TRANSACTION_REJECTED,
                Some(id),
                json!({ "failed_checks": failed_checks }),
            )
            .await;

        Ok(updated)
    }

    /// Manual rejection by an employee, no external call involved.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<Transaction, AppError> {
        require_role(actor, Role::Employee)?;

        let tx = self.repo.get_by_id(id).await?;
        require_status(&tx, TransactionStatus::Pending)?;

        let updated = self
            .repo
            .update_status(
                id,
                StatusChange {
                    expected: TransactionStatus::Pending,
                    new: TransactionStatus::Rejected,
                    notes: notes.clone(),
                    submission_ref: None,
                },
            )
            .await?;

        tracing::info!(transaction_id = %id, "payment rejected");
        self.audit
            .record(
                actor.id,
                ACTION_TRANSACTION_REJECTED,
                Some(id),
                json!({ "notes": notes }),
            )
            .await;

        Ok(updated)
    }

    /// Submits a verified payment to the settlement network and records the
    /// generated submission reference.
    pub async fn submit_to_network(&self, actor: &Actor, id: Uuid) -> Result<Transaction, AppError> {
        require_role(actor, Role::Employee)?;

        let tx = self.repo.get_by_id(id).await?;
        require_status(&tx, TransactionStatus::Verified)?;

        let submission_ref = format!(
            "SWIFT-{}-{}",
            tx.id.simple(),
            Utc::now().format("%Y%m%d%H%M%S")
        );

        let updated = self
            .repo
            .update_status(
                id,
                StatusChange {
                    expected: TransactionStatus::Verified,
                    new: TransactionStatus::Completed,
                    notes: None,
                    submission_ref: Some(submission_ref.clone()),
                },
            )
            .await?;

        tracing::info!(transaction_id = %id, %submission_ref, "payment submitted to network");
        self.audit
            .record(
                actor.id,
                ACTION_SWIFT_SUBMISSION,
                Some(id),
                json!({
                    "submission_ref": submission_ref,
                    "amount": updated.amount.to_string(),
                    "currency": updated.currency,
                    "payee_account": updated.payee_account,
                    "payee_name": updated.payee_name,
                    "swift_code": updated.swift_code,
                }),
            )
            .await;

        Ok(updated)
    }
}

fn require_role(actor: &Actor, role: Role) -> Result<(), AppError> {
    if actor.role != role {
        return Err(AppError::Forbidden(format!("{} role required", role)));
    }
    Ok(())
}

fn require_status(tx: &Transaction, required: TransactionStatus) -> Result<(), AppError> {
    if tx.status != required {
        return Err(AppError::InvalidState {
            current: tx.status.to_string(),
            required: required.to_string(),
        });
    }
    Ok(())
}

fn named_failure(check: &str, reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!("{} ({})", check, reason),
        None => check.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreValidationConfig;
    use crate::ports::{RepositoryError, RepositoryResult};
    use crate::prevalidation::TEST_SIGNING_KEY;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    struct InMemoryRepository {
        rows: Mutex<HashMap<Uuid, Transaction>>,
    }

    impl InMemoryRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl TransactionRepository for InMemoryRepository {
        async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
            let mut rows = self.rows.lock().unwrap();
            rows.insert(tx.id, tx.clone());
            Ok(tx.clone())
        }

        async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
            let rows = self.rows.lock().unwrap();
            rows.get(&id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
        }

        async fn list_by_customer(
            &self,
            customer_id: Uuid,
            status: Option<TransactionStatus>,
            _page: Page,
        ) -> RepositoryResult<(Vec<Transaction>, i64)> {
            let rows = self.rows.lock().unwrap();
            let items: Vec<Transaction> = rows
                .values()
                .filter(|tx| tx.customer_id == customer_id)
                .filter(|tx| status.map_or(true, |s| tx.status == s))
                .cloned()
                .collect();
            let total = items.len() as i64;
            Ok((items, total))
        }

        async fn list_by_status(
            &self,
            status: TransactionStatus,
            _page: Page,
        ) -> RepositoryResult<(Vec<Transaction>, i64)> {
            let rows = self.rows.lock().unwrap();
            let items: Vec<Transaction> = rows
                .values()
                .filter(|tx| tx.status == status)
                .cloned()
                .collect();
            let total = items.len() as i64;
            Ok((items, total))
        }

        async fn update_status(
            &self,
            id: Uuid,
            change: StatusChange,
        ) -> RepositoryResult<Transaction> {
            let mut rows = self.rows.lock().unwrap();
            let tx = rows
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

            if tx.status != change.expected {
                return Err(RepositoryError::Conflict(format!(
                    "transaction {} is '{}', expected '{}'",
                    id, tx.status, change.expected
                )));
            }

            tx.status = change.new;
            if change.notes.is_some() {
                tx.notes = change.notes;
            }
            if change.submission_ref.is_some() {
                tx.submission_ref = change.submission_ref;
            }
            tx.updated_at = Utc::now();
            Ok(tx.clone())
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        entries: Mutex<Vec<(Uuid, String, Option<Uuid>, serde_json::Value)>>,
    }

    impl RecordingAudit {
        fn actions_for(&self, id: Uuid) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, _, tx, _)| *tx == Some(id))
                .map(|(_, action, _, _)| action.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AuditRecorder for RecordingAudit {
        async fn record(
            &self,
            actor_id: Uuid,
            action: &str,
            transaction_id: Option<Uuid>,
            detail: serde_json::Value,
        ) {
            self.entries.lock().unwrap().push((
                actor_id,
                action.to_string(),
                transaction_id,
                detail,
            ));
        }
    }

    struct Harness {
        workflow: TransactionWorkflow,
        audit: Arc<RecordingAudit>,
        customer: Actor,
        employee: Actor,
    }

    fn test_client(base_url: &str) -> PreValidationClient {
        PreValidationClient::new(&PreValidationConfig {
            base_url: base_url.to_string(),
            token_url: format!("{}/oauth2/token", base_url),
            revoke_url: format!("{}/oauth2/revoke", base_url),
            consumer_key: "swiftgate-consumer".to_string(),
            signing_key_pem: TEST_SIGNING_KEY.to_string(),
            signing_cert_chain: vec![],
            signing_subject_dn: Some("cn=swiftgate,o=bank,l=za".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn harness(base_url: &str) -> Harness {
        harness_with_subject(base_url, Some("cn=swiftgate,o=bank,l=za".to_string()))
    }

    fn harness_with_subject(base_url: &str, subject_dn: Option<String>) -> Harness {
        let audit = Arc::new(RecordingAudit::default());
        let workflow = TransactionWorkflow::new(
            Arc::new(InMemoryRepository::new()),
            audit.clone(),
            test_client(base_url),
            BigDecimal::from_str("100000.00").unwrap(),
            subject_dn,
        );

        Harness {
            workflow,
            audit,
            customer: Actor::new(Uuid::new_v4(), Role::Customer),
            employee: Actor::new(Uuid::new_v4(), Role::Employee),
        }
    }

    fn payment_request() -> PaymentRequest {
        PaymentRequest {
            amount: "1000.50".to_string(),
            currency: "usd".to_string(),
            payee_account: "payee123".to_string(),
            swift_code: "sbzazajj".to_string(),
            payee_name: "Jane Smith".to_string(),
        }
    }

    async fn mock_token(server: &mut mockito::Server) {
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"token-1","refresh_token":null,"expires_in":3600}"#)
            .create_async()
            .await;
    }

    async fn mock_check(server: &mut mockito::Server, path: &str, body: &str) {
        server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn create_normalizes_and_audits() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount, BigDecimal::from_str("1000.50").unwrap());
        assert_eq!(tx.currency, "USD");
        assert_eq!(tx.payee_account, "PAYEE123");
        assert_eq!(tx.swift_code, "SBZAZAJJ");
        assert_eq!(tx.customer_id, h.customer.id);
        assert_eq!(
            h.audit.actions_for(tx.id),
            vec![ACTION_TRANSACTION_CREATED.to_string()]
        );
    }

    #[tokio::test]
    async fn create_requires_customer_role() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let result = h
            .workflow
            .create_payment(&h.employee, payment_request())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn create_collects_all_field_failures() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let request = PaymentRequest {
            amount: "0".to_string(),
            currency: "x".to_string(),
            payee_account: "!".to_string(),
            swift_code: "bad".to_string(),
            payee_name: "".to_string(),
        };

        match h.workflow.create_payment(&h.customer, request).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 5),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn verify_transitions_to_verified_when_both_checks_match() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_check(
            &mut server,
            "/v1/beneficiary-accounts/verify",
            r#"{"match_indicator":"MTCH"}"#,
        )
        .await;
        mock_check(
            &mut server,
            "/v1/data-providers/validate",
            r#"{"match_indicator":"MTCH"}"#,
        )
        .await;

        let h = harness(&server.url());
        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let verified = h
            .workflow
            .pre_validate_and_verify(&h.employee, tx.id)
            .await
            .unwrap();

        assert_eq!(verified.status, TransactionStatus::Verified);
        assert_eq!(
            h.audit.actions_for(tx.id),
            vec![
                ACTION_TRANSACTION_CREATED.to_string(),
                ACTION_TRANSACTION_VERIFIED.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn verify_rejects_when_account_check_fails() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_check(
            &mut server,
            "/v1/beneficiary-accounts/verify",
            r#"{"match_indicator":"NMTC","reason":"account closed"}"#,
        )
        .await;
        mock_check(
            &mut server,
            "/v1/data-providers/validate",
            r#"{"match_indicator":"MTCH"}"#,
        )
        .await;

        let h = harness(&server.url());
        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let rejected = h
            .workflow
            .pre_validate_and_verify(&h.employee, tx.id)
            .await
            .unwrap();

        assert_eq!(rejected.status, TransactionStatus::Rejected);
        let notes = rejected.notes.unwrap();
        assert!(notes.contains("account_verification"));
        assert!(notes.contains("account closed"));
        assert!(!notes.contains("data_provider"));

        let actions = h.audit.actions_for(tx.id);
        assert!(actions.contains(&ACTION_TRANSACTION_REJECTED.to_string()));
        assert!(!actions.contains(&ACTION_TRANSACTION_VERIFIED.to_string()));
    }

    #[tokio::test]
    async fn verify_leaves_pending_on_external_failure() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        server
            .mock("POST", "/v1/beneficiary-accounts/verify")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let h = harness(&server.url());
        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let result = h.workflow.pre_validate_and_verify(&h.employee, tx.id).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));

        let current = h.workflow.get_payment(&h.employee, tx.id).await.unwrap();
        assert_eq!(current.status, TransactionStatus::Pending);
        assert_eq!(
            h.audit.actions_for(tx.id),
            vec![ACTION_TRANSACTION_CREATED.to_string()]
        );
    }

    #[tokio::test]
    async fn verify_requires_pending_status() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;

        let h = harness(&server.url());
        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();
        h.workflow
            .reject(&h.employee, tx.id, None)
            .await
            .unwrap();

        let result = h.workflow.pre_validate_and_verify(&h.employee, tx.id).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidState { current, required })
                if current == "rejected" && required == "pending"
        ));
    }

    #[tokio::test]
    async fn verify_without_signing_identity_is_configuration_error() {
        let server = mockito::Server::new_async().await;
        let h = harness_with_subject(&server.url(), None);

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let result = h.workflow.pre_validate_and_verify(&h.employee, tx.id).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn reject_stores_notes_and_audits() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let rejected = h
            .workflow
            .reject(&h.employee, tx.id, Some("payee flagged".to_string()))
            .await
            .unwrap();

        assert_eq!(rejected.status, TransactionStatus::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some("payee flagged"));
        assert!(h
            .audit
            .actions_for(tx.id)
            .contains(&ACTION_TRANSACTION_REJECTED.to_string()));
    }

    #[tokio::test]
    async fn reject_requires_employee_role() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let result = h.workflow.reject(&h.customer, tx.id, None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn concurrent_rejects_let_exactly_one_win() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            h.workflow.reject(&h.employee, tx.id, Some("one".to_string())),
            h.workflow.reject(&h.employee, tx.id, Some("two".to_string())),
        );

        let outcomes = [first, second];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 1);

        let current = h.workflow.get_payment(&h.employee, tx.id).await.unwrap();
        assert_eq!(current.status, TransactionStatus::Rejected);
    }

    #[tokio::test]
    async fn submit_completes_verified_payment_with_reference() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_check(
            &mut server,
            "/v1/beneficiary-accounts/verify",
            r#"{"match_indicator":"MTCH"}"#,
        )
        .await;
        mock_check(
            &mut server,
            "/v1/data-providers/validate",
            r#"{"match_indicator":"MTCH"}"#,
        )
        .await;

        let h = harness(&server.url());
        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();
        h.workflow
            .pre_validate_and_verify(&h.employee, tx.id)
            .await
            .unwrap();

        let completed = h
            .workflow
            .submit_to_network(&h.employee, tx.id)
            .await
            .unwrap();

        assert_eq!(completed.status, TransactionStatus::Completed);
        let submission_ref = completed.submission_ref.unwrap();
        assert!(submission_ref.contains(&tx.id.simple().to_string()));

        let submissions = h
            .audit
            .actions_for(tx.id)
            .into_iter()
            .filter(|action| action == ACTION_SWIFT_SUBMISSION)
            .count();
        assert_eq!(submissions, 1);
    }

    #[tokio::test]
    async fn submit_requires_verified_status() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let result = h.workflow.submit_to_network(&h.employee, tx.id).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidState { current, required })
                if current == "pending" && required == "verified"
        ));
    }

    #[tokio::test]
    async fn customers_cannot_see_other_customers_payments() {
        let server = mockito::Server::new_async().await;
        let h = harness(&server.url());

        let tx = h
            .workflow
            .create_payment(&h.customer, payment_request())
            .await
            .unwrap();

        let other = Actor::new(Uuid::new_v4(), Role::Customer);
        let result = h.workflow.get_payment(&other, tx.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
