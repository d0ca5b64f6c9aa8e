mod bootstrap;
mod cards;
mod collaborators;
mod health;
mod messages;
mod routes;

use anyhow::Result;
use helpdesk_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use helpdesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging must be up before bootstrap emits its events.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap(config).await?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        agent_mode = app.config.agents.mode.as_str(),
        "helpdesk-server started"
    );
    axum::serve(listener, routes::app(&app)).with_graceful_shutdown(wait_for_shutdown()).await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "helpdesk-server stopping"
    );

    app.db_pool.close().await;
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}
