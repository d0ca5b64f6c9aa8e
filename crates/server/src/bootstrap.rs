use std::sync::Arc;

use helpdesk_agent::{Collaborator, RouterAgent};
use helpdesk_core::config::{AgentMode, AppConfig};
use helpdesk_db::{connect_with_settings, migrations, DbPool};
use helpdesk_mcp::{HelpdeskMcpServer, InProcessCollaborator, SupportDesk};
use thiserror::Error;
use tracing::info;

use crate::collaborators::HttpCollaborator;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: RouterAgent,
    pub store: HelpdeskMcpServer,
    pub support: SupportDesk,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("agent http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        agent_mode = config.agents.mode.as_str(),
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let store = HelpdeskMcpServer::from_pool(db_pool.clone());
    let support = SupportDesk::new(store.tickets());
    let collaborator: Arc<dyn Collaborator> = match config.agents.mode {
        AgentMode::InProcess => {
            Arc::new(InProcessCollaborator::new(store.clone(), support.clone()))
        }
        AgentMode::Http => Arc::new(
            HttpCollaborator::new(&config.agents).map_err(BootstrapError::HttpClient)?,
        ),
    };

    Ok(Application { config, db_pool, router: RouterAgent::new(collaborator), store, support })
}
