use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiftgate_core::adapters::PostgresTransactionRepository;
use swiftgate_core::config::Config;
use swiftgate_core::db;
use swiftgate_core::db::audit::PostgresAuditRecorder;
use swiftgate_core::prevalidation::PreValidationClient;
use swiftgate_core::services::workflow::TransactionWorkflow;
use swiftgate_core::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Pre-validation client; a bad signing key is fatal here, not at the
    // first verification request.
    let client = PreValidationClient::new(&config.prevalidation)
        .map_err(|e| anyhow::anyhow!("Failed to initialize pre-validation client: {}", e))?;
    let tokens = client.tokens().clone();
    tracing::info!(
        "Pre-validation client initialized with URL: {}",
        config.prevalidation.base_url
    );

    let workflow = Arc::new(TransactionWorkflow::new(
        Arc::new(PostgresTransactionRepository::new(pool.clone())),
        Arc::new(PostgresAuditRecorder::new(pool.clone())),
        client,
        config.transaction_ceiling.clone(),
        config.prevalidation.signing_subject_dn.clone(),
    ));

    let app = create_app(AppState { workflow });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Drop the cached external token on the way out.
    tokens.revoke().await;

    Ok(())
}
