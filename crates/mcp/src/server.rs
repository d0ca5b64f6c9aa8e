//! JSON-RPC tool server over the record store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use helpdesk_core::domain::ticket::DEFAULT_PRIORITY;
use helpdesk_db::repositories::{
    CustomerRepository, CustomerUpdate, SqlCustomerRepository, SqlTicketRepository,
    TicketRepository,
};
use helpdesk_db::DbPool;

use crate::args::{customer_id, object, optional_i64, optional_str, required_str};
use crate::tools::STORE_TOOL_SPECS;
use crate::{McpError, McpResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub id: Option<Value>,
}

fn jsonrpc_version() -> String {
    "2.0".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl From<&McpError> for JsonRpcError {
    fn from(error: &McpError) -> Self {
        Self { code: error.error_code(), message: error.to_string() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: jsonrpc_version(), id, result: Some(result), error: None }
    }

    fn failure(id: Option<Value>, error: &McpError) -> Self {
        Self { jsonrpc: jsonrpc_version(), id, result: None, error: Some(error.into()) }
    }
}

/// Store tool server. Cheap to clone; repositories are shared.
#[derive(Clone)]
pub struct HelpdeskMcpServer {
    customers: Arc<dyn CustomerRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl HelpdeskMcpServer {
    pub fn new(customers: Arc<dyn CustomerRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { customers, tickets }
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlCustomerRepository::new(pool.clone())),
            Arc::new(SqlTicketRepository::new(pool)),
        )
    }

    pub fn tickets(&self) -> Arc<dyn TicketRepository> {
        self.tickets.clone()
    }

    pub fn server_info() -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": "helpdesk-mcp", "version": env!("CARGO_PKG_VERSION")},
        })
    }

    pub fn list_tools() -> Value {
        json!({ "tools": STORE_TOOL_SPECS.iter().map(|spec| spec.to_json()).collect::<Vec<_>>() })
    }

    /// Handles one JSON-RPC request. Every failure becomes an `error` member;
    /// this never fails itself.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let params = request.params.unwrap_or_default();
        debug!(method = %request.method, "json-rpc request received");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(Self::server_info()),
            "notifications/initialized" => Ok(json!({ "ok": true })),
            "tools/list" => Ok(Self::list_tools()),
            "tools/call" => self.tools_call(&params).await,
            other => Err(McpError::UnknownMethod(other.to_string())),
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                warn!(method = %request.method, code = error.error_code(), error = %error, "json-rpc request failed");
                JsonRpcResponse::failure(id, &error)
            }
        }
    }

    async fn tools_call(&self, params: &Map<String, Value>) -> McpResult<Value> {
        let tool = optional_str(params, "tool")
            .or_else(|| optional_str(params, "name"))
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        if tool.is_empty() {
            return Err(McpError::Validation("Tool name not provided".to_string()));
        }
        let arguments = object(params, &["arguments", "params"])?.cloned().unwrap_or_default();
        self.call_tool(&tool, &arguments).await
    }

    /// Runs a store tool by name.
    pub async fn call_tool(&self, tool: &str, args: &Map<String, Value>) -> McpResult<Value> {
        match tool {
            "get_customer" => {
                let customer = self.customers.find_by_id(customer_id(args)?).await?;
                Ok(json!({ "customer": customer }))
            }
            "list_customers" => {
                let status = optional_str(args, "status").filter(|status| !status.is_empty());
                let limit = optional_i64(args, "limit")?.unwrap_or(DEFAULT_LIST_LIMIT);
                let limit = u32::try_from(limit).map_err(|_| {
                    McpError::Validation(format!("`limit` must be between 0 and {}", u32::MAX))
                })?;
                let customers = self.customers.list(status.as_deref(), limit).await?;
                Ok(json!({ "customers": customers }))
            }
            "update_customer" => {
                let id = customer_id(args)?;
                let fields = object(args, &["data", "fields"])?.cloned().unwrap_or_default();
                let update = CustomerUpdate::from_json(&fields)?;
                let updated = self.customers.update_fields(id, &update).await?;
                Ok(json!({ "updated": updated }))
            }
            "create_ticket" => {
                let id = customer_id(args)?;
                let issue = required_str(args, "issue")?;
                let priority =
                    optional_str(args, "priority").unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
                let ticket_id = self.tickets.create(id, &issue, &priority).await?;
                Ok(json!({ "ticket_id": ticket_id, "created": true }))
            }
            "get_customer_history" => {
                let tickets = self.tickets.history(customer_id(args)?).await?;
                Ok(json!({ "tickets": tickets }))
            }
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use helpdesk_core::domain::customer::Customer;
    use helpdesk_db::repositories::{InMemoryCustomerRepository, InMemoryTicketRepository};

    use super::{HelpdeskMcpServer, JsonRpcRequest};

    fn server() -> HelpdeskMcpServer {
        HelpdeskMcpServer::new(
            Arc::new(InMemoryCustomerRepository::with_customers([Customer::new(1, "John")])),
            Arc::new(InMemoryTicketRepository::default()),
        )
    }

    fn request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        serde_json::from_value(json!({"jsonrpc": "2.0", "id": 7, "method": method, "params": params}))
            .expect("request")
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server_name() {
        let response = server().handle(request("initialize", json!({}))).await;
        let result = response.result.expect("result");
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "helpdesk-mcp");
        assert_eq!(response.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn missing_tool_name_is_invalid_params() {
        let response = server().handle(request("tools/call", json!({"arguments": {}}))).await;
        let error = response.error.expect("error");
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "Tool name not provided");
    }

    #[tokio::test]
    async fn tool_name_and_arguments_accept_aliases() {
        let response = server()
            .handle(request(
                "tools/call",
                json!({"name": " get_customer ", "params": {"customer_id": "1"}}),
            ))
            .await;
        assert_eq!(response.result.expect("result")["customer"]["name"], "John");
    }

    #[tokio::test]
    async fn unknown_method_and_tool_are_method_not_found() {
        let method = server().handle(request("resources/list", json!({}))).await;
        assert_eq!(method.error.expect("error").message, "Unknown method: resources/list");

        let tool = server().handle(request("tools/call", json!({"tool": "drop_tables"}))).await;
        let error = tool.error.expect("error");
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Unknown tool: drop_tables");
    }
}
