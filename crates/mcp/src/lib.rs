//! Helpdesk tool surfaces
//!
//! This crate exposes the record store and the reply drafter as tools that
//! agents call by name with JSON arguments.
//!
//! ## Architecture
//!
//! - `HelpdeskMcpServer`: JSON-RPC 2.0 dispatcher over the customer and
//!   ticket repositories (`initialize`, `tools/list`, `tools/call`), served
//!   behind `POST /mcp`
//! - `stdio`: the same store tools as an `rmcp` server on stdin/stdout
//! - `SupportDesk`: support-agent tools (reply drafting, ticket reports)
//! - `InProcessCollaborator`: the router's collaborator port served by the
//!   two dispatchers above, without any transport
//! - `tools`: tool catalogue and input schemas
//!
//! ## Example Usage
//!
//! ```no_run
//! use helpdesk_mcp::HelpdeskMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = helpdesk_db::connect("sqlite://helpdesk.db").await?;
//!     HelpdeskMcpServer::from_pool(pool).run_stdio().await
//! }
//! ```

mod args;
pub mod collaborator;
pub mod server;
pub mod stdio;
pub mod support;
pub mod tools;

pub use collaborator::InProcessCollaborator;
pub use server::{HelpdeskMcpServer, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use support::SupportDesk;
pub use tools::*;

use helpdesk_core::errors::{ApplicationError, DomainError};
use helpdesk_db::repositories::RepositoryError;
use thiserror::Error;

/// Errors specific to tool dispatch
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool execution error: {0}")]
    Database(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::NotFound(_) | McpError::Validation(_) => -32602, // Invalid params
            McpError::UnknownTool(_) | McpError::UnknownMethod(_) => -32601, // Method not found
            McpError::Database(RepositoryError::Validation(_)) => -32602,
            McpError::Database(_) => -32001, // Tool execution failure
            McpError::Internal(_) => -32603,
        }
    }
}

/// Caller mistakes are invalid input; store failures are persistence.
impl From<&McpError> for ApplicationError {
    fn from(error: &McpError) -> Self {
        match error {
            McpError::Database(RepositoryError::Validation(_))
            | McpError::Validation(_)
            | McpError::NotFound(_)
            | McpError::UnknownTool(_)
            | McpError::UnknownMethod(_) => {
                DomainError::InvalidInput(error.to_string()).into()
            }
            McpError::Database(_) => Self::Persistence(error.to_string()),
            McpError::Internal(_) => Self::Integration(error.to_string()),
        }
    }
}

/// Result type for tool operations
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use helpdesk_core::errors::ApplicationError;
    use helpdesk_db::repositories::RepositoryError;

    use super::McpError;

    #[test]
    fn error_codes_follow_json_rpc_conventions() {
        assert_eq!(McpError::Validation("customer_id".into()).error_code(), -32602);
        assert_eq!(McpError::UnknownTool("x".into()).error_code(), -32601);
        assert_eq!(McpError::UnknownMethod("x".into()).error_code(), -32601);
        assert_eq!(McpError::Database(RepositoryError::Decode("bad".into())).error_code(), -32001);
        assert_eq!(
            McpError::Database(RepositoryError::Validation("no fields to update".into()))
                .error_code(),
            -32602
        );
        assert_eq!(McpError::Internal("x".into()).error_code(), -32603);
    }

    #[test]
    fn caller_mistakes_and_store_failures_map_to_distinct_layers() {
        assert!(matches!(
            ApplicationError::from(&McpError::UnknownTool("x".into())),
            ApplicationError::Domain(_)
        ));
        assert!(matches!(
            ApplicationError::from(&McpError::Database(RepositoryError::Validation("f".into()))),
            ApplicationError::Domain(_)
        ));
        assert!(matches!(
            ApplicationError::from(&McpError::Database(RepositoryError::Decode("bad".into()))),
            ApplicationError::Persistence(_)
        ));
    }

    #[test]
    fn unknown_tool_message_names_the_tool() {
        assert_eq!(McpError::UnknownTool("explode".into()).to_string(), "Unknown tool: explode");
    }
}
