//! MCP protocol over stdin/stdout, served through `rmcp`.
//!
//! The store tools are the same ones `HelpdeskMcpServer::call_tool` runs for
//! the HTTP dialect. Results come back as a single text content block holding
//! the tool's JSON; tool-level failures are `isError` results, an unknown
//! tool is a protocol error.

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, ErrorData, Implementation,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
    transport::stdio,
    ServiceExt,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::server::HelpdeskMcpServer;
use crate::tools::{ToolSpec, STORE_TOOL_SPECS};
use crate::McpError;

fn tool(spec: &ToolSpec) -> Tool {
    let schema = match spec.input_schema() {
        Value::Object(schema) => schema,
        _ => Map::new(),
    };
    Tool::new(spec.name, spec.description, schema)
}

pub fn store_tools() -> Vec<Tool> {
    STORE_TOOL_SPECS.iter().map(tool).collect()
}

fn tool_result(result: Result<Value, McpError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::text(value.to_string())])),
        Err(error @ McpError::UnknownTool(_)) => {
            Err(ErrorData::new(ErrorCode(error.error_code()), error.to_string(), None))
        }
        Err(error) => Ok(CallToolResult::error(vec![Content::text(error.to_string())])),
    }
}

impl ServerHandler for HelpdeskMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "helpdesk-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some("Customer and ticket records for the helpdesk agents".to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(store_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        let result = HelpdeskMcpServer::call_tool(self, &request.name, &arguments).await;
        if let Err(error) = &result {
            warn!(
                event_name = "mcp.stdio.tool_failed",
                correlation_id = "stdio",
                tool = %request.name,
                code = error.error_code(),
                error = %error,
                "stdio tool call failed"
            );
        }
        tool_result(result)
    }
}

impl HelpdeskMcpServer {
    /// Serves the MCP protocol on stdin/stdout until the client disconnects.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(
            event_name = "system.mcp.stdio_started",
            correlation_id = "bootstrap",
            "Starting MCP server with stdio transport"
        );

        let service = self.serve(stdio()).await?;
        service.waiting().await?;

        info!(
            event_name = "system.mcp.stdio_stopped",
            correlation_id = "shutdown",
            "MCP server shutdown complete"
        );
        Ok(())
    }
}
