use std::sync::Arc;

use helpdesk_agent::{RouteError, RouteOutcome, RouterAgent};
use helpdesk_mcp::{HelpdeskMcpServer, InProcessCollaborator};
use serde_json::{json, Map, Value};

use crate::commands::{connect_and_migrate, prepare, CommandResult, StepFailure};

const CORRELATION_ID: &str = "cli";

#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub text: String,
    pub customer_id: Option<i64>,
    pub new_email: Option<String>,
    /// Forced route label; `None` classifies the text.
    pub intent: Option<String>,
}

impl RouteRequest {
    fn arguments(&self) -> Map<String, Value> {
        let mut arguments = Map::new();
        arguments.insert("text".to_string(), Value::String(self.text.clone()));
        if let Some(customer_id) = self.customer_id {
            arguments.insert("customer_id".to_string(), json!(customer_id));
        }
        if let Some(new_email) = &self.new_email {
            arguments.insert("new_email".to_string(), Value::String(new_email.clone()));
        }
        arguments
    }
}

pub fn run(request: RouteRequest) -> CommandResult {
    let (config, runtime) = match prepare("route") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;
        let store = HelpdeskMcpServer::from_pool(pool.clone());
        let agent = RouterAgent::new(Arc::new(InProcessCollaborator::from_store(store)));

        let arguments = request.arguments();
        let outcome = match &request.intent {
            Some(label) => agent.route_as(label, &request.text, &arguments, CORRELATION_ID).await,
            None => agent.route(&request.text, &arguments, CORRELATION_ID).await,
        };

        pool.close().await;
        Ok::<Result<RouteOutcome, RouteError>, StepFailure>(outcome)
    });

    match result {
        Ok(Ok(outcome)) => CommandResult::routed("route", json!(outcome)),
        Ok(Err(error)) => routing_failure(&error),
        Err(failure) => CommandResult::from_step_failure("route", failure),
    }
}

fn routing_failure(error: &RouteError) -> CommandResult {
    let logs = Some(error.logs().to_vec());
    CommandResult::failure_with_logs("route", "routing", error.to_string(), 7, logs)
}
