//! Capability cards advertised at `GET /a2a/{agent}/agent_card`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use helpdesk_agent::runtime::ROUTER_TOOLS;
use helpdesk_mcp::{ToolSpec, STORE_TOOL_SPECS, SUPPORT_TOOL_SPECS};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentProvider {
    pub name: &'static str,
    pub sdk: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSkill {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: Value,
}

impl From<&ToolSpec> for AgentSkill {
    fn from(spec: &ToolSpec) -> Self {
        Self { name: spec.name, description: spec.description, inputs: spec.input_schema() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentCard {
    pub id: String,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub provider: AgentProvider,
    pub skills: Vec<AgentSkill>,
    pub endpoints: BTreeMap<&'static str, String>,
}

/// Returns `None` for agents this service does not host.
pub fn agent_card(agent: &str) -> Option<AgentCard> {
    let (name, description, skills) = match agent {
        "router" => (
            "Router Agent",
            "Classifies requests and coordinates the data and support agents.",
            router_skills(),
        ),
        "data" => (
            "Customer Data Agent",
            "Reads and updates customer and ticket records.",
            STORE_TOOL_SPECS.iter().map(AgentSkill::from).collect(),
        ),
        "support" => (
            "Support Agent",
            "Drafts support replies and aggregates ticket reports.",
            SUPPORT_TOOL_SPECS.iter().map(AgentSkill::from).collect(),
        ),
        _ => return None,
    };

    let mut endpoints = BTreeMap::new();
    endpoints.insert("card", format!("/a2a/{agent}/agent_card"));
    endpoints.insert("call", format!("/a2a/{agent}/call"));
    endpoints.insert("message", format!("/a2a/{agent}/message"));

    Some(AgentCard {
        id: format!("{agent}-agent"),
        name,
        description,
        version: env!("CARGO_PKG_VERSION"),
        provider: AgentProvider { name: "helpdesk", sdk: "A2A JSON over HTTP" },
        skills,
        endpoints,
    })
}

fn router_skills() -> Vec<AgentSkill> {
    ROUTER_TOOLS
        .into_iter()
        .map(|name| AgentSkill {
            name,
            description: "Classify a request and call the right agents",
            inputs: json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"},
                    "customer_id": {"type": "integer"},
                    "new_email": {"type": "string"},
                },
                "required": ["text"],
            }),
        })
        .collect()
}
