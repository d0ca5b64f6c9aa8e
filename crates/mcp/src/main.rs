//! Helpdesk MCP Server Binary
//!
//! Serves the store tools over the MCP stdio transport.
//!
//! ## Usage
//!
//! ```bash
//! # Run against the configured database (helpdesk.toml / HELPDESK_* env)
//! helpdesk-mcp
//!
//! # Run with a specific database
//! HELPDESK_DATABASE_URL=sqlite://helpdesk.db helpdesk-mcp
//! ```

use anyhow::Result;
use helpdesk_core::config::{AppConfig, LoadOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;

    // stdout carries the protocol, so logs go to stderr
    let level = config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    info!(
        event_name = "system.mcp.starting",
        correlation_id = "bootstrap",
        database_url = %config.database.url,
        "starting helpdesk MCP server"
    );

    let db_pool = helpdesk_db::connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await?;
    helpdesk_db::migrations::run_pending(&db_pool).await?;

    helpdesk_mcp::HelpdeskMcpServer::from_pool(db_pool).run_stdio().await
}
