use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use helpdesk_core::domain::customer::Customer;
use helpdesk_core::domain::ticket::Ticket;

use crate::classifier::{classify, Intent};
use crate::envelope::{
    open_ticket_summaries, update_summary, upgrade_guidance, CustomerLookup, FinalAnswer,
    RouteOutcome,
};
use crate::extraction::{extract, Entities};
use crate::plan::{Plan, Step};
use crate::tools::{Collaborator, CollaboratorError};

pub const ROUTER_TOOLS: [&str; 2] = ["route_task", "route"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arguments: Map<String, Value>,
}

/// `"arguments": null` reads as no arguments.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ToolCall {
    pub fn route_task(text: impl Into<String>) -> Self {
        let mut arguments = Map::new();
        arguments.insert("text".to_string(), Value::String(text.into()));
        Self { tool: "route_task".to_string(), arguments }
    }

    pub fn text(&self) -> String {
        match self.arguments.get("text") {
            Some(Value::String(text)) => text.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// What the router answers to a call: a routed envelope, or a structured
/// refusal for a tool it does not expose.
#[derive(Clone, Debug, PartialEq)]
pub enum CallReply {
    Routed(RouteOutcome),
    UnknownTool(String),
}

impl CallReply {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Routed(outcome) => json!(outcome),
            Self::UnknownTool(tool) => json!({ "error": format!("Unknown tool: {tool}") }),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("step {step} ({tool}) failed: {source}")]
    StepFailed {
        intent: Option<Intent>,
        step: usize,
        tool: &'static str,
        /// Trace up to, but not including, the failing step.
        logs: Vec<String>,
        #[source]
        source: CollaboratorError,
    },
}

impl RouteError {
    pub fn logs(&self) -> &[String] {
        match self {
            Self::StepFailed { logs, .. } => logs,
        }
    }
}

/// Results accumulated while a plan runs; later steps and the final answer
/// read from here.
#[derive(Default)]
struct Scratch {
    customer: Option<Option<Customer>>,
    listed: Vec<Customer>,
    histories: Vec<(Customer, Vec<Ticket>)>,
    history: Vec<Ticket>,
    reply: String,
}

#[derive(Clone)]
pub struct RouterAgent {
    collaborator: Arc<dyn Collaborator>,
}

impl RouterAgent {
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self { collaborator }
    }

    /// Entry point for `{tool, arguments}` calls.
    pub async fn call(&self, call: &ToolCall, correlation_id: &str) -> Result<CallReply, RouteError> {
        if !ROUTER_TOOLS.contains(&call.tool.as_str()) {
            warn!(
                event_name = "router.call.unknown_tool",
                correlation_id = %correlation_id,
                tool = %call.tool,
                "router call rejected"
            );
            return Ok(CallReply::UnknownTool(call.tool.clone()));
        }
        self.route(&call.text(), &call.arguments, correlation_id).await.map(CallReply::Routed)
    }

    pub async fn message(
        &self,
        message: &Message,
        correlation_id: &str,
    ) -> Result<CallReply, RouteError> {
        self.call(&ToolCall::route_task(message.content.clone()), correlation_id).await
    }

    /// Classifies the text, extracts entities and runs the resulting plan.
    pub async fn route(
        &self,
        text: &str,
        arguments: &Map<String, Value>,
        correlation_id: &str,
    ) -> Result<RouteOutcome, RouteError> {
        let intent = classify(text);
        let entities = extract(intent, text, arguments);
        info!(
            event_name = "router.request.classified",
            correlation_id = %correlation_id,
            intent = intent.as_str(),
            customer_id = entities.customer_id.0,
            "request classified"
        );
        self.execute(Plan::for_intent(intent, entities, text), correlation_id).await
    }

    /// Runs a plan built for a forced route label. Unknown labels take the
    /// fallback route.
    pub async fn route_as(
        &self,
        label: &str,
        text: &str,
        arguments: &Map<String, Value>,
        correlation_id: &str,
    ) -> Result<RouteOutcome, RouteError> {
        let entities = match Intent::parse(label) {
            Some(intent) => extract(intent, text, arguments),
            None => extract(Intent::Support, text, arguments),
        };
        self.execute(Plan::for_label(label, entities, text), correlation_id).await
    }

    pub async fn execute(&self, plan: Plan, correlation_id: &str) -> Result<RouteOutcome, RouteError> {
        let mut logs = Vec::with_capacity(plan.steps.len() + 1);
        logs.extend(plan.classification_line());
        let mut scratch = Scratch::default();

        for (index, planned) in plan.steps.iter().enumerate() {
            let tool = planned.step.tool().name();
            if let Err(source) = self.run_step(&planned.step, &mut scratch).await {
                warn!(
                    event_name = "router.plan.step_failed",
                    correlation_id = %correlation_id,
                    intent = plan.label(),
                    step = index,
                    tool,
                    error = %source,
                    "plan aborted"
                );
                return Err(RouteError::StepFailed {
                    intent: plan.intent,
                    step: index,
                    tool,
                    logs,
                    source,
                });
            }
            logs.push(planned.trace.to_string());
            info!(
                event_name = "router.plan.step_completed",
                correlation_id = %correlation_id,
                intent = plan.label(),
                step = index,
                tool,
                "plan step completed"
            );
        }

        let answer = final_answer(plan.intent, &plan.entities, scratch);
        Ok(RouteOutcome::new(plan.intent, logs, answer))
    }

    async fn run_step(&self, step: &Step, scratch: &mut Scratch) -> Result<(), CollaboratorError> {
        match step {
            Step::GetCustomer { customer_id } => {
                scratch.customer = Some(self.collaborator.get_customer(*customer_id).await?);
            }
            Step::ListCustomers { status, limit } => {
                scratch.listed = self.collaborator.list_customers(Some(*status), *limit).await?;
            }
            Step::HistoryForEachListed => {
                for customer in std::mem::take(&mut scratch.listed) {
                    let tickets = self.collaborator.get_customer_history(customer.id).await?;
                    scratch.histories.push((customer, tickets));
                }
            }
            Step::UpdateCustomer { customer_id, email } => {
                let mut fields = Map::new();
                fields.insert("email".to_string(), Value::String(email.clone()));
                self.collaborator.update_customer(*customer_id, fields).await?;
            }
            Step::GetCustomerHistory { customer_id } => {
                scratch.history = self.collaborator.get_customer_history(*customer_id).await?;
            }
            Step::SupportReply { text } => {
                scratch.reply = self.collaborator.simple_support_reply(text, None).await?.text;
            }
        }
        Ok(())
    }
}

fn final_answer(intent: Option<Intent>, entities: &Entities, scratch: Scratch) -> FinalAnswer {
    match intent {
        Some(Intent::Data) => FinalAnswer::Customer(CustomerLookup::new(
            entities.customer_id,
            scratch.customer.flatten(),
        )),
        Some(Intent::MultiOpen) => FinalAnswer::OpenTickets(open_ticket_summaries(&scratch.histories)),
        Some(Intent::MultiCoord) => FinalAnswer::Text(upgrade_guidance(
            entities.customer_id,
            scratch.customer.as_ref().map(Option::as_ref),
            &scratch.reply,
        )),
        Some(Intent::MultiUpdate) => {
            FinalAnswer::Text(update_summary(&entities.new_email, &scratch.history))
        }
        Some(Intent::Support) | None => FinalAnswer::Text(scratch.reply),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::{CallReply, ToolCall};

    #[test]
    fn text_argument_defaults_to_empty() {
        let call = ToolCall { tool: "route".to_string(), arguments: Map::new() };
        assert_eq!(call.text(), "");
        assert_eq!(ToolCall::route_task("hi").text(), "hi");
    }

    #[test]
    fn null_or_missing_arguments_read_as_empty() {
        for body in [json!({"tool": "route_task", "arguments": null}), json!({"tool": "route_task"})] {
            let call: ToolCall = serde_json::from_value(body).expect("call");
            assert!(call.arguments.is_empty());
        }
        let call: Result<ToolCall, _> =
            serde_json::from_value(json!({"tool": "route_task", "arguments": [1]}));
        assert!(call.is_err());
    }

    #[test]
    fn unknown_tool_reply_is_structured() {
        assert_eq!(
            CallReply::UnknownTool("explode".to_string()).to_json(),
            json!({"error": "Unknown tool: explode"})
        );
    }
}
