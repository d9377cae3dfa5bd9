use anyhow::Context;
use bigdecimal::BigDecimal;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub prevalidation: PreValidationConfig,
    /// Inclusive upper bound for a single payment amount.
    pub transaction_ceiling: BigDecimal,
}

/// Settings for the external pre-validation service and its OAuth2 endpoints.
#[derive(Debug, Clone)]
pub struct PreValidationConfig {
    pub base_url: String,
    pub token_url: String,
    pub revoke_url: String,
    /// Service consumer key, used as the `iss` claim of signed assertions.
    pub consumer_key: String,
    /// PEM-encoded RSA private key for signing JWT-bearer assertions.
    pub signing_key_pem: String,
    /// Certificate chain carried in the assertion header (x5c entries).
    pub signing_cert_chain: Vec<String>,
    /// Subject DN identifying the calling institution. Operations that need
    /// a signing identity fail with a configuration error when unset.
    pub signing_subject_dn: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let signing_key_path = env::var("PREVALIDATION_SIGNING_KEY_PATH")
            .context("PREVALIDATION_SIGNING_KEY_PATH must be set")?;
        let signing_key_pem = std::fs::read_to_string(&signing_key_path)
            .with_context(|| format!("cannot read signing key at {}", signing_key_path))?;

        let signing_cert_chain = env::var("PREVALIDATION_SIGNING_CERT_CHAIN")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            prevalidation: PreValidationConfig {
                base_url: env::var("PREVALIDATION_BASE_URL")?,
                token_url: env::var("PREVALIDATION_TOKEN_URL")?,
                revoke_url: env::var("PREVALIDATION_REVOKE_URL")?,
                consumer_key: env::var("PREVALIDATION_CONSUMER_KEY")?,
                signing_key_pem,
                signing_cert_chain,
                signing_subject_dn: env::var("PREVALIDATION_SUBJECT_DN").ok(),
                timeout_secs: env::var("PREVALIDATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()?,
            },
            transaction_ceiling: parse_ceiling(
                &env::var("TRANSACTION_CEILING").unwrap_or_else(|_| "100000.00".to_string()),
            )?,
        })
    }
}

fn parse_ceiling(raw: &str) -> anyhow::Result<BigDecimal> {
    let ceiling: BigDecimal = raw
        .trim()
        .parse()
        .with_context(|| format!("TRANSACTION_CEILING is not a decimal: {}", raw))?;

    if ceiling <= BigDecimal::from(0) {
        anyhow::bail!("TRANSACTION_CEILING must be positive");
    }

    Ok(ceiling)
}
