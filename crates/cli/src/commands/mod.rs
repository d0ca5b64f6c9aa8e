pub mod migrate;
pub mod route;
pub mod seed;

use helpdesk_core::config::{AppConfig, LoadOptions};
use helpdesk_core::errors::ApplicationError;
use helpdesk_db::{connect_with_settings, migrations, DbPool};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

/// `(error_class, message, exit_code)` for a failed step.
pub(crate) type StepFailure = (&'static str, String, u8);

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Default, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    envelope: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logs: Option<Vec<String>>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            message: Some(message.into()),
            ..CommandOutcome::default()
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn routed(command: &str, envelope: Value) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            envelope: Some(envelope),
            ..CommandOutcome::default()
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_logs(command, error_class, message, exit_code, None)
    }

    /// Failure that also reports the trace recorded before the failing step.
    pub fn failure_with_logs(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        logs: Option<Vec<String>>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: Some(message.into()),
            envelope: None,
            logs,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_step_failure(command: &str, (error_class, message, exit_code): StepFailure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration and builds the single-threaded runtime every command
/// runs on. Failures are already rendered as the command's result.
pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            ApplicationError::from(error).to_string(),
            2,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

pub(crate) async fn connect_and_migrate(config: &AppConfig) -> Result<DbPool, StepFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;
    Ok(pool)
}
