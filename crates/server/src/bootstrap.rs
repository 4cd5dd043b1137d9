use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use mailduet_agent::{GenerationError, HttpLlmClient, LlmClient};
use mailduet_core::config::{AppConfig, ConfigError};
use mailduet_core::personas::DemoCast;
use mailduet_core::scoring::FitScorer;
use mailduet_db::{
    connect_with_settings, migrations, DbPool, ProcessedEventRepository, SessionRepository,
    SqlProcessedEventRepository, SqlSessionRepository, SqlWebhookLogRepository,
    WebhookLogRepository,
};
use mailduet_mail::{GatewayError, HttpMailGateway, MailGateway};

use crate::processor::WebhookProcessor;
use crate::{demo, health, webhook};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("mail gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("llm client setup failed: {0}")]
    Llm(#[from] GenerationError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let sessions: Arc<dyn SessionRepository> =
        Arc::new(SqlSessionRepository::new(db_pool.clone()));
    let processed: Arc<dyn ProcessedEventRepository> =
        Arc::new(SqlProcessedEventRepository::new(db_pool.clone()));
    let journal: Arc<dyn WebhookLogRepository> =
        Arc::new(SqlWebhookLogRepository::new(db_pool.clone()));

    let gateway: Arc<dyn MailGateway> = Arc::new(HttpMailGateway::from_config(&config.mail)?);
    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::from_config(&config.llm)?);
    let cast = DemoCast::default();

    let processor = Arc::new(WebhookProcessor::new(
        sessions.clone(),
        processed,
        journal.clone(),
        gateway.clone(),
        llm.clone(),
        cast.clone(),
        FitScorer::new(config.scoring),
    ));

    let router = Router::new()
        .merge(health::router(db_pool.clone()))
        .merge(webhook::router(webhook::WebhookState {
            processor,
            webhook_secret: config.mail.webhook_secret.clone(),
        }))
        .merge(demo::router(demo::DemoState {
            sessions,
            journal,
            gateway,
            llm,
            cast: Arc::new(cast),
            max_exchanges: config.demo.max_exchanges,
            public_base_url: config.demo.public_base_url.clone(),
        }));

    Ok(Application { config, db_pool, router })
}
