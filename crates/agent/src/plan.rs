use helpdesk_core::domain::customer::CustomerId;

use crate::classifier::Intent;
use crate::extraction::Entities;
use crate::tools::CollaboratorTool;

pub const ACTIVE_STATUS: &str = "active";
pub const LIST_LIMIT: u32 = 200;

pub const DATA_AGENT_USED_TOOLS: &str = "Data Agent used MCP tools";
pub const DATA_AGENT_INVOKED: &str = "Data Agent invoked via MCP";
pub const SUPPORT_AGENT_REPLIED: &str = "Support Agent generated reply";
pub const SUPPORT_AGENT_COORDINATED: &str = "Support Agent generated coordinated response";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    GetCustomer { customer_id: CustomerId },
    ListCustomers { status: &'static str, limit: u32 },
    /// Fetches the history of every customer the preceding list step returned,
    /// in listed order.
    HistoryForEachListed,
    UpdateCustomer { customer_id: CustomerId, email: String },
    GetCustomerHistory { customer_id: CustomerId },
    SupportReply { text: String },
}

impl Step {
    pub fn tool(&self) -> CollaboratorTool {
        match self {
            Self::GetCustomer { .. } => CollaboratorTool::GetCustomer,
            Self::ListCustomers { .. } => CollaboratorTool::ListCustomers,
            Self::HistoryForEachListed | Self::GetCustomerHistory { .. } => {
                CollaboratorTool::GetCustomerHistory
            }
            Self::UpdateCustomer { .. } => CollaboratorTool::UpdateCustomer,
            Self::SupportReply { .. } => CollaboratorTool::SimpleSupportReply,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: Step,
    /// Appended to the trace once the step completes.
    pub trace: &'static str,
}

fn planned(step: Step, trace: &'static str) -> PlannedStep {
    PlannedStep { step, trace }
}

/// The ordered steps for one request. `intent` is `None` for the fallback
/// route, which replies through the support agent and records no
/// classification line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub intent: Option<Intent>,
    pub entities: Entities,
    pub text: String,
    pub steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn for_intent(intent: Intent, entities: Entities, text: &str) -> Self {
        let steps = match intent {
            Intent::Data => vec![planned(
                Step::GetCustomer { customer_id: entities.customer_id },
                DATA_AGENT_USED_TOOLS,
            )],
            Intent::Support => vec![planned(
                Step::SupportReply { text: text.to_string() },
                SUPPORT_AGENT_REPLIED,
            )],
            Intent::MultiOpen => vec![
                planned(
                    Step::ListCustomers { status: ACTIVE_STATUS, limit: LIST_LIMIT },
                    DATA_AGENT_INVOKED,
                ),
                planned(Step::HistoryForEachListed, SUPPORT_AGENT_COORDINATED),
            ],
            Intent::MultiCoord => {
                let mut steps = Vec::with_capacity(2);
                if entities.has_customer() {
                    steps.push(planned(
                        Step::GetCustomer { customer_id: entities.customer_id },
                        DATA_AGENT_INVOKED,
                    ));
                }
                steps.push(planned(
                    Step::SupportReply { text: text.to_string() },
                    SUPPORT_AGENT_COORDINATED,
                ));
                steps
            }
            Intent::MultiUpdate => vec![
                planned(
                    Step::UpdateCustomer {
                        customer_id: entities.customer_id,
                        email: entities.new_email.clone(),
                    },
                    DATA_AGENT_INVOKED,
                ),
                planned(
                    Step::GetCustomerHistory { customer_id: entities.customer_id },
                    SUPPORT_AGENT_COORDINATED,
                ),
            ],
        };

        Self { intent: Some(intent), entities, text: text.to_string(), steps }
    }

    /// Plans for an explicit route label such as `MULTI_UPDATE`. Labels that
    /// name no intent get the fallback plan.
    pub fn for_label(label: &str, entities: Entities, text: &str) -> Self {
        match Intent::parse(label) {
            Some(intent) => Self::for_intent(intent, entities, text),
            None => Self::fallback(entities, text),
        }
    }

    pub fn fallback(entities: Entities, text: &str) -> Self {
        Self {
            intent: None,
            entities,
            text: text.to_string(),
            steps: vec![planned(
                Step::SupportReply { text: text.to_string() },
                SUPPORT_AGENT_REPLIED,
            )],
        }
    }

    /// First trace line, absent on the fallback route.
    pub fn classification_line(&self) -> Option<String> {
        self.intent.map(|intent| format!("Router classified as {}", intent.trace_label()))
    }

    pub fn label(&self) -> &'static str {
        self.intent.map(|intent| intent.as_str()).unwrap_or("FALLBACK")
    }
}
