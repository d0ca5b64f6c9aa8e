//! Tool catalogue
//!
//! Tools are grouped by the agent that serves them:
//! - Store: customer and ticket records (served by `HelpdeskMcpServer`)
//! - Support: reply drafting and ticket reports (served by `SupportDesk`)

use serde_json::{json, Value};

/// Store tools category
pub struct StoreTools;

/// Support tools category
pub struct SupportTools;

/// Tool category trait
pub trait ToolCategory {
    /// Category name
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// List of tool names in this category
    fn tool_names() -> &'static [&'static str]
    where
        Self: Sized;
}

impl ToolCategory for StoreTools {
    fn category_name() -> &'static str {
        "store"
    }
    fn tool_names() -> &'static [&'static str] {
        &["get_customer", "list_customers", "update_customer", "get_customer_history", "create_ticket"]
    }
}

impl ToolCategory for SupportTools {
    fn category_name() -> &'static str {
        "support"
    }
    fn tool_names() -> &'static [&'static str] {
        &["simple_support_reply", "suggest_resolution", "create_ticket", "tickets_report_for_customers"]
    }
}

/// Name, description and JSON input schema of one tool.
#[derive(Clone, Copy, Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    schema: fn() -> Value,
}

impl ToolSpec {
    pub fn input_schema(&self) -> Value {
        (self.schema)()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

fn customer_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"customer_id": {"type": "integer"}},
        "required": ["customer_id"],
    })
}

fn list_customers_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": {"type": ["string", "null"]},
            "limit": {"type": "integer"},
        },
        "required": ["limit"],
    })
}

fn update_customer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "customer_id": {"type": "integer"},
            "data": {"type": "object"},
        },
        "required": ["customer_id", "data"],
    })
}

fn create_ticket_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "customer_id": {"type": "integer"},
            "issue": {"type": "string"},
            "priority": {"type": "string"},
        },
        "required": ["customer_id", "issue", "priority"],
    })
}

fn support_text_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"},
            "customer_id": {"type": ["integer", "null"]},
        },
        "required": ["text"],
    })
}

fn tickets_report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "customer_ids": {"type": "array", "items": {"type": "integer"}},
            "priority": {"type": ["string", "null"]},
        },
        "required": ["customer_ids"],
    })
}

pub const STORE_TOOL_SPECS: &[ToolSpec] = &[
    ToolSpec {
        name: "get_customer",
        description: "Get a single customer by ID",
        schema: customer_id_schema,
    },
    ToolSpec {
        name: "list_customers",
        description: "List customers (optional status, limit)",
        schema: list_customers_schema,
    },
    ToolSpec {
        name: "update_customer",
        description: "Update fields on a customer",
        schema: update_customer_schema,
    },
    ToolSpec {
        name: "get_customer_history",
        description: "List tickets for a customer",
        schema: customer_id_schema,
    },
    ToolSpec {
        name: "create_ticket",
        description: "Create a support ticket",
        schema: create_ticket_schema,
    },
];

pub const SUPPORT_TOOL_SPECS: &[ToolSpec] = &[
    ToolSpec {
        name: "simple_support_reply",
        description: "Return a short textual reply based on the issue context",
        schema: support_text_schema,
    },
    ToolSpec {
        name: "suggest_resolution",
        description: "Draft a support suggestion with the customer's ticket history as context",
        schema: support_text_schema,
    },
    ToolSpec {
        name: "create_ticket",
        description: "Create a support ticket",
        schema: create_ticket_schema,
    },
    ToolSpec {
        name: "tickets_report_for_customers",
        description: "Aggregate tickets for a list of customers; optional priority filter",
        schema: tickets_report_schema,
    },
];

/// All distinct tool names across categories
pub const ALL_TOOL_NAMES: &[&str] = &[
    "get_customer",
    "list_customers",
    "update_customer",
    "get_customer_history",
    "create_ticket",
    "simple_support_reply",
    "suggest_resolution",
    "tickets_report_for_customers",
];

/// Total number of tools
pub const TOTAL_TOOLS: usize = ALL_TOOL_NAMES.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_counts() {
        assert_eq!(StoreTools::tool_names().len(), 5);
        assert_eq!(SupportTools::tool_names().len(), 4);
        assert_eq!(TOTAL_TOOLS, 8);
    }

    #[test]
    fn specs_match_category_listings() {
        let store = STORE_TOOL_SPECS.iter().map(|spec| spec.name).collect::<Vec<_>>();
        let support = SUPPORT_TOOL_SPECS.iter().map(|spec| spec.name).collect::<Vec<_>>();
        assert_eq!(store, StoreTools::tool_names());
        assert_eq!(support, SupportTools::tool_names());
        for name in store.iter().chain(support.iter()) {
            assert!(ALL_TOOL_NAMES.contains(name), "{name} missing from ALL_TOOL_NAMES");
        }
    }

    #[test]
    fn schemas_declare_required_arguments() {
        let create = STORE_TOOL_SPECS[4].to_json();
        assert_eq!(create["name"], "create_ticket");
        assert_eq!(create["inputSchema"]["required"], json!(["customer_id", "issue", "priority"]));
    }
}
