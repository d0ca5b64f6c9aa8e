//! Support-agent tools: reply drafting, resolution suggestions and ticket
//! reports.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use helpdesk_core::domain::customer::CustomerId;
use helpdesk_core::domain::ticket::DEFAULT_PRIORITY;
use helpdesk_core::support;
use helpdesk_db::repositories::TicketRepository;

use crate::args::{customer_id, optional_customer_id, optional_str, required_str};
use crate::{McpError, McpResult};

#[derive(Clone)]
pub struct SupportDesk {
    tickets: Arc<dyn TicketRepository>,
}

impl SupportDesk {
    pub fn new(tickets: Arc<dyn TicketRepository>) -> Self {
        Self { tickets }
    }

    pub async fn call_tool(&self, tool: &str, args: &Map<String, Value>) -> McpResult<Value> {
        match tool {
            "simple_support_reply" => {
                let text = optional_str(args, "text").unwrap_or_default();
                self.simple_support_reply(&text, optional_customer_id(args)?).await
            }
            "suggest_resolution" => {
                let text = optional_str(args, "text").unwrap_or_default();
                self.suggest_resolution(&text, optional_customer_id(args)?).await
            }
            "create_ticket" => {
                let id = customer_id(args)?;
                let issue = required_str(args, "issue")?;
                let priority =
                    optional_str(args, "priority").unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
                let ticket_id = self.tickets.create(id, &issue, &priority).await?;
                Ok(json!({ "ticket_id": ticket_id, "created": true }))
            }
            "tickets_report_for_customers" => {
                let ids = customer_ids(args)?;
                let priority = optional_str(args, "priority").filter(|p| !p.is_empty());
                self.tickets_report(&ids, priority.as_deref()).await
            }
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }

    /// History lookups that fail degrade to an error marker in the context
    /// instead of failing the suggestion.
    async fn history_context(&self, customer_id: Option<CustomerId>) -> Map<String, Value> {
        let mut context = Map::new();
        let Some(customer_id) = customer_id else {
            return context;
        };
        let history = match self.tickets.history(customer_id).await {
            Ok(tickets) => json!({ "tickets": tickets }),
            Err(error) => {
                warn!(
                    event_name = "support.history.unavailable",
                    customer_id = customer_id.0,
                    error = %error,
                    "ticket history unavailable for suggestion context"
                );
                json!({ "error": "history unavailable" })
            }
        };
        context.insert("history".to_string(), history);
        context
    }

    pub async fn suggest_resolution(
        &self,
        text: &str,
        customer_id: Option<CustomerId>,
    ) -> McpResult<Value> {
        let draft = support::draft(text);
        let context = self.history_context(customer_id).await;
        Ok(json!({
            "suggestion": draft.suggestion,
            "context": context,
            "intent": draft.topic,
        }))
    }

    pub async fn simple_support_reply(
        &self,
        text: &str,
        customer_id: Option<CustomerId>,
    ) -> McpResult<Value> {
        let draft = support::draft(text);
        let context = self.history_context(customer_id).await;
        Ok(json!({
            "text": draft.reply_text(),
            "intent": draft.topic,
            "context": context,
        }))
    }

    async fn tickets_report(&self, ids: &[CustomerId], priority: Option<&str>) -> McpResult<Value> {
        let mut report = Vec::with_capacity(ids.len());
        for id in ids {
            let tickets = self
                .tickets
                .history(*id)
                .await?
                .into_iter()
                .filter(|ticket| priority.map_or(true, |priority| ticket.has_priority(priority)))
                .collect::<Vec<_>>();
            report.push(json!({ "customer_id": id, "tickets": tickets }));
        }
        Ok(json!({ "report": report, "filter_priority": priority }))
    }
}

fn customer_ids(args: &Map<String, Value>) -> McpResult<Vec<CustomerId>> {
    let Some(values) = args.get("customer_ids") else {
        return Ok(Vec::new());
    };
    let values = values.as_array().ok_or_else(|| {
        McpError::Validation("`customer_ids` must be a list of integers".to_string())
    })?;
    values
        .iter()
        .map(|value| {
            let mut single = Map::new();
            single.insert("customer_id".to_string(), value.clone());
            customer_id(&single)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use helpdesk_core::domain::customer::CustomerId;
    use helpdesk_core::domain::ticket::{Ticket, TicketId};
    use helpdesk_core::support::SUGGESTION_TEXT;
    use helpdesk_db::repositories::InMemoryTicketRepository;

    use super::SupportDesk;
    use crate::args::into_map;

    fn ticket(id: i64, customer_id: i64, priority: &str) -> Ticket {
        Ticket {
            id: TicketId(id),
            customer_id: Some(CustomerId(customer_id)),
            issue: Some(format!("Issue {id}")),
            status: Some("open".to_string()),
            priority: Some(priority.to_string()),
            created_at: Some(format!("2025-02-0{id}T10:00:00Z")),
            extra: Default::default(),
        }
    }

    fn desk() -> SupportDesk {
        SupportDesk::new(Arc::new(InMemoryTicketRepository::with_tickets([
            ticket(1, 1, "high"),
            ticket(2, 1, "low"),
            ticket(3, 2, "HIGH"),
        ])))
    }

    #[tokio::test]
    async fn simple_reply_uses_suggestion_text_and_topic() {
        let reply = desk()
            .call_tool("simple_support_reply", &into_map(json!({"text": "I want a refund"})))
            .await
            .expect("reply");
        assert_eq!(reply["text"], SUGGESTION_TEXT);
        assert_eq!(reply["intent"], "billing");
        assert_eq!(reply["context"], json!({}));
    }

    #[tokio::test]
    async fn suggestion_attaches_history_when_customer_given() {
        let suggestion = desk()
            .call_tool("suggest_resolution", &into_map(json!({"text": "late delivery", "customer_id": 1})))
            .await
            .expect("suggestion");
        assert_eq!(suggestion["intent"], "shipping");
        assert_eq!(suggestion["context"]["history"]["tickets"][0]["id"], 2);
    }

    #[tokio::test]
    async fn report_filters_priority_case_insensitively() {
        let report = desk()
            .call_tool(
                "tickets_report_for_customers",
                &into_map(json!({"customer_ids": [1, 2], "priority": "high"})),
            )
            .await
            .expect("report");
        assert_eq!(report["filter_priority"], "high");
        assert_eq!(report["report"][0]["tickets"].as_array().map(Vec::len), Some(1));
        assert_eq!(report["report"][1]["tickets"][0]["id"], 3);
    }

    #[tokio::test]
    async fn unknown_support_tool_is_rejected() {
        let error = desk().call_tool("get_customer", &into_map(json!({}))).await.expect_err("unknown");
        assert_eq!(error.to_string(), "Unknown tool: get_customer");
    }
}
