use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use helpdesk_core::domain::customer::{Customer, CustomerId};
use helpdesk_core::domain::ticket::{Ticket, TicketId};

/// Which backend agent owns a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Data,
    Support,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Support => "support",
        }
    }
}

/// Every tool the router may invoke on a collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollaboratorTool {
    GetCustomer,
    ListCustomers,
    UpdateCustomer,
    CreateTicket,
    GetCustomerHistory,
    SimpleSupportReply,
}

impl CollaboratorTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetCustomer => "get_customer",
            Self::ListCustomers => "list_customers",
            Self::UpdateCustomer => "update_customer",
            Self::CreateTicket => "create_ticket",
            Self::GetCustomerHistory => "get_customer_history",
            Self::SimpleSupportReply => "simple_support_reply",
        }
    }

    pub fn agent(&self) -> AgentKind {
        match self {
            Self::SimpleSupportReply => AgentKind::Support,
            _ => AgentKind::Data,
        }
    }

    /// Calls that may touch many rows or draft text get the longer budget.
    pub fn is_fanout(&self) -> bool {
        matches!(self, Self::ListCustomers | Self::SimpleSupportReply)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{tool} returned an error: {message}")]
    Remote { tool: &'static str, message: String },
    #[error("{tool} could not be reached: {message}")]
    Transport { tool: &'static str, message: String },
    #[error("{tool} returned an unreadable payload: {message}")]
    Malformed { tool: &'static str, message: String },
}

impl CollaboratorError {
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Remote { tool, .. } | Self::Transport { tool, .. } | Self::Malformed { tool, .. } => {
                tool
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTicket {
    pub ticket_id: TicketId,
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportReply {
    #[serde(default)]
    pub text: String,
    #[serde(default = "general_intent")]
    pub intent: String,
}

fn general_intent() -> String {
    "general".to_string()
}

/// The narrow call contract the router depends on. One method per tool; the
/// transport behind it is the implementor's concern.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, CollaboratorError>;

    async fn list_customers(
        &self,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, CollaboratorError>;

    async fn update_customer(
        &self,
        id: CustomerId,
        fields: Map<String, Value>,
    ) -> Result<bool, CollaboratorError>;

    async fn create_ticket(
        &self,
        id: CustomerId,
        issue: &str,
        priority: &str,
    ) -> Result<CreatedTicket, CollaboratorError>;

    /// Newest first.
    async fn get_customer_history(&self, id: CustomerId) -> Result<Vec<Ticket>, CollaboratorError>;

    async fn simple_support_reply(
        &self,
        text: &str,
        customer_id: Option<CustomerId>,
    ) -> Result<SupportReply, CollaboratorError>;
}

/// Wire arguments for a tool, in the shape the data and support agents accept.
pub mod wire {
    use serde_json::{json, Map, Value};

    use helpdesk_core::domain::customer::CustomerId;

    pub fn get_customer(id: CustomerId) -> Value {
        json!({ "customer_id": id })
    }

    pub fn list_customers(status: Option<&str>, limit: u32) -> Value {
        json!({ "status": status, "limit": limit })
    }

    pub fn update_customer(id: CustomerId, fields: Map<String, Value>) -> Value {
        json!({ "customer_id": id, "data": fields })
    }

    pub fn create_ticket(id: CustomerId, issue: &str, priority: &str) -> Value {
        json!({ "customer_id": id, "issue": issue, "priority": priority })
    }

    pub fn get_customer_history(id: CustomerId) -> Value {
        json!({ "customer_id": id })
    }

    pub fn simple_support_reply(text: &str, customer_id: Option<CustomerId>) -> Value {
        json!({ "text": text, "customer_id": customer_id })
    }
}

/// Decoders for collaborator payloads. A payload that carries `error` is a
/// remote failure regardless of which tool produced it.
pub mod payload {
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    use helpdesk_core::domain::customer::Customer;
    use helpdesk_core::domain::ticket::Ticket;

    use super::{CollaboratorError, CollaboratorTool, CreatedTicket, SupportReply};

    pub fn check_remote_error(tool: CollaboratorTool, payload: &Value) -> Result<(), CollaboratorError> {
        match payload.get("error") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::String(message)) => {
                Err(CollaboratorError::Remote { tool: tool.name(), message: message.clone() })
            }
            Some(other) => {
                Err(CollaboratorError::Remote { tool: tool.name(), message: other.to_string() })
            }
        }
    }

    fn field<T: DeserializeOwned>(
        tool: CollaboratorTool,
        payload: &Value,
        key: &str,
    ) -> Result<T, CollaboratorError> {
        check_remote_error(tool, payload)?;
        let value = payload.get(key).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|error| CollaboratorError::Malformed {
            tool: tool.name(),
            message: format!("field `{key}`: {error}"),
        })
    }

    fn whole<T: DeserializeOwned>(
        tool: CollaboratorTool,
        payload: Value,
    ) -> Result<T, CollaboratorError> {
        check_remote_error(tool, &payload)?;
        serde_json::from_value(payload).map_err(|error| CollaboratorError::Malformed {
            tool: tool.name(),
            message: error.to_string(),
        })
    }

    pub fn customer(payload: &Value) -> Result<Option<Customer>, CollaboratorError> {
        field(CollaboratorTool::GetCustomer, payload, "customer")
    }

    pub fn customers(payload: &Value) -> Result<Vec<Customer>, CollaboratorError> {
        let listed: Option<Vec<Customer>> =
            field(CollaboratorTool::ListCustomers, payload, "customers")?;
        Ok(listed.unwrap_or_default())
    }

    pub fn updated(payload: &Value) -> Result<bool, CollaboratorError> {
        let updated: Option<bool> = field(CollaboratorTool::UpdateCustomer, payload, "updated")?;
        Ok(updated.unwrap_or(false))
    }

    pub fn created_ticket(payload: Value) -> Result<CreatedTicket, CollaboratorError> {
        whole(CollaboratorTool::CreateTicket, payload)
    }

    pub fn tickets(payload: &Value) -> Result<Vec<Ticket>, CollaboratorError> {
        let tickets: Option<Vec<Ticket>> =
            field(CollaboratorTool::GetCustomerHistory, payload, "tickets")?;
        Ok(tickets.unwrap_or_default())
    }

    pub fn support_reply(payload: Value) -> Result<SupportReply, CollaboratorError> {
        whole(CollaboratorTool::SimpleSupportReply, payload)
    }
}
