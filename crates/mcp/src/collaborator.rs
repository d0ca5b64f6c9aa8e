use async_trait::async_trait;
use serde_json::{Map, Value};

use helpdesk_agent::tools::{
    payload, wire, AgentKind, Collaborator, CollaboratorError, CollaboratorTool, CreatedTicket,
    SupportReply,
};
use helpdesk_core::domain::customer::{Customer, CustomerId};
use helpdesk_core::domain::ticket::Ticket;

use crate::args::into_map;
use crate::{HelpdeskMcpServer, McpError, SupportDesk};

/// Serves the router's collaborator port from the store and support
/// dispatchers in the same process. Payloads take the same JSON path they
/// would over HTTP, so both adapters decode identically.
#[derive(Clone)]
pub struct InProcessCollaborator {
    store: HelpdeskMcpServer,
    support: SupportDesk,
}

impl InProcessCollaborator {
    pub fn new(store: HelpdeskMcpServer, support: SupportDesk) -> Self {
        Self { store, support }
    }

    pub fn from_store(store: HelpdeskMcpServer) -> Self {
        let support = SupportDesk::new(store.tickets());
        Self::new(store, support)
    }

    async fn invoke(
        &self,
        tool: CollaboratorTool,
        arguments: Value,
    ) -> Result<Value, CollaboratorError> {
        let arguments = into_map(arguments);
        let result = match tool.agent() {
            AgentKind::Data => self.store.call_tool(tool.name(), &arguments).await,
            AgentKind::Support => self.support.call_tool(tool.name(), &arguments).await,
        };
        result.map_err(|error| remote(tool, error))
    }
}

fn remote(tool: CollaboratorTool, error: McpError) -> CollaboratorError {
    CollaboratorError::Remote { tool: tool.name(), message: error.to_string() }
}

#[async_trait]
impl Collaborator for InProcessCollaborator {
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
