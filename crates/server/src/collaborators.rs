//! Collaborator port over HTTP: each tool call is a `POST {tool, arguments}`
//! to `<base>/a2a/{data|support}/call`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use helpdesk_agent::tools::{
    payload, wire, AgentKind, Collaborator, CollaboratorError, CollaboratorTool, CreatedTicket,
    SupportReply,
};
use helpdesk_core::config::AgentsConfig;
use helpdesk_core::domain::customer::{Customer, CustomerId};
use helpdesk_core::domain::ticket::Ticket;

#[derive(Clone, Debug)]
pub struct HttpCollaborator {
    client: reqwest::Client,
    data_base_url: String,
    support_base_url: String,
    lookup_timeout: Duration,
    fanout_timeout: Duration,
}

impl HttpCollaborator {
    pub fn new(config: &AgentsConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            data_base_url: config.data_base_url.trim_end_matches('/').to_string(),
            support_base_url: config.support_base_url.trim_end_matches('/').to_string(),
            lookup_timeout: Duration::from_secs(config.lookup_timeout_secs),
            fanout_timeout: Duration::from_secs(config.fanout_timeout_secs),
        })
    }

    fn endpoint(&self, tool: CollaboratorTool) -> String {
        let agent = tool.agent();
        let base = match agent {
            AgentKind::Data => &self.data_base_url,
            AgentKind::Support => &self.support_base_url,
        };
        format!("{base}/a2a/{}/call", agent.as_str())
    }

    fn timeout(&self, tool: CollaboratorTool) -> Duration {
        if tool.is_fanout() {
            self.fanout_timeout
        } else {
            self.lookup_timeout
        }
    }

    /// Returns the body's `result` member when present, otherwise the whole
    /// body. Bodies carrying `error` are remote failures.
    async fn invoke(
        &self,
        tool: CollaboratorTool,
        arguments: Value,
    ) -> Result<Value, CollaboratorError> {
        let endpoint = self.endpoint(tool);
        debug!(tool = tool.name(), endpoint = %endpoint, "calling collaborator");

        let response = self
            .client
            .post(&endpoint)
            .timeout(self.timeout(tool))
            .json(&json!({ "tool": tool.name(), "arguments": arguments }))
            .send()
            .await
            .map_err(|error| transport(tool, error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(tool, format!("{endpoint} answered HTTP {status}")));
        }

        let mut body: Value = response.json().await.map_err(|error| {
            CollaboratorError::Malformed { tool: tool.name(), message: error.to_string() }
        })?;
        payload::check_remote_error(tool, &body)?;

        match body.as_object_mut().and_then(|object| object.remove("result")) {
            Some(result) => Ok(result),
            None => Ok(body),
        }
    }
}

fn transport(tool: CollaboratorTool, message: String) -> CollaboratorError {
    warn!(tool = tool.name(), error = %message, "collaborator transport failure");
    CollaboratorError::Transport { tool: tool.name(), message }
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, CollaboratorError> {
        let result = self.invoke(CollaboratorTool::GetCustomer, wire::get_customer(id)).await?;
        payload::customer(&result)
    }

    async fn list_customers(
        &self,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, CollaboratorError> {
        let result =
            self.invoke(CollaboratorTool::ListCustomers, wire::list_customers(status, limit)).await?;
        payload::customers(&result)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        fields: Map<String, Value>,
    ) -> Result<bool, CollaboratorError> {
        let result =
            self.invoke(CollaboratorTool::UpdateCustomer, wire::update_customer(id, fields)).await?;
        payload::updated(&result)
    }

    async fn create_ticket(
        &self,
        id: CustomerId,
        issue: &str,
        priority: &str,
    ) -> Result<CreatedTicket, CollaboratorError> {
        let result = self
            .invoke(CollaboratorTool::CreateTicket, wire::create_ticket(id, issue, priority))
            .await?;
        payload::created_ticket(result)
    }

    async fn get_customer_history(&self, id: CustomerId) -> Result<Vec<Ticket>, CollaboratorError> {
        let result =
            self.invoke(CollaboratorTool::GetCustomerHistory, wire::get_customer_history(id)).await?;
        payload::tickets(&result)
    }

    async fn simple_support_reply(
        &self,
        text: &str,
        customer_id: Option<CustomerId>,
    ) -> Result<SupportReply, CollaboratorError> {
        let result = self
            .invoke(
                CollaboratorTool::SimpleSupportReply,
                wire::simple_support_reply(text, customer_id),
            )
            .await?;
        payload::support_reply(result)
    }
}
