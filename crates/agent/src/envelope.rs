//! Shapes raw collaborator results into the per-route final answer and the
//! envelope returned to callers.
//!
//! The envelope carries `scenario`, `route`, `logs` and `final` at the top
//! level and repeats the same four fields under `result`. Both copies are
//! produced from one [`RouteOutcome`] by one `Serialize` impl.

use serde::{Serialize, Serializer};

use helpdesk_core::domain::customer::{Customer, CustomerId};
use helpdesk_core::domain::ticket::Ticket;

use crate::classifier::Intent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Scenario {
    #[serde(rename = "data")]
    Data,
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "multi-intent")]
    MultiIntent,
}

impl Scenario {
    pub fn for_intent(intent: Option<Intent>) -> Self {
        match intent {
            Some(Intent::Data) => Self::Data,
            Some(intent) if intent.is_multi() => Self::MultiIntent,
            _ => Self::Support,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Self::Data => "router -> data",
            Self::Support => "router -> support",
            Self::MultiIntent => "router -> data -> support",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerLookup {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub customer_id: CustomerId,
    pub customer: Option<Customer>,
}

impl CustomerLookup {
    pub fn new(customer_id: CustomerId, customer: Option<Customer>) -> Self {
        Self { kind: "get_customer", customer_id, customer }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenTicketSummary {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub open_tickets: usize,
    pub issues: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FinalAnswer {
    Customer(CustomerLookup),
    OpenTickets(Vec<OpenTicketSummary>),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteOutcome {
    pub scenario: Scenario,
    pub logs: Vec<String>,
    pub answer: FinalAnswer,
}

impl RouteOutcome {
    pub fn new(intent: Option<Intent>, logs: Vec<String>, answer: FinalAnswer) -> Self {
        Self { scenario: Scenario::for_intent(intent), logs, answer }
    }

    pub fn route(&self) -> &'static str {
        self.scenario.route()
    }

    fn body(&self) -> Body<'_> {
        Body { scenario: self.scenario, route: self.route(), logs: &self.logs, answer: &self.answer }
    }
}

#[derive(Clone, Copy, Serialize)]
struct Body<'a> {
    scenario: Scenario,
    route: &'static str,
    logs: &'a [String],
    #[serde(rename = "final")]
    answer: &'a FinalAnswer,
}

#[derive(Serialize)]
struct Wire<'a> {
    #[serde(flatten)]
    body: Body<'a>,
    result: Body<'a>,
}

impl Serialize for RouteOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = self.body();
        Wire { body, result: body }.serialize(serializer)
    }
}

/// Active customers paired with their histories, reduced to those holding at
/// least one open ticket. Listed order is kept.
pub fn open_ticket_summaries(histories: &[(Customer, Vec<Ticket>)]) -> Vec<OpenTicketSummary> {
    histories
        .iter()
        .filter_map(|(customer, tickets)| {
            let open = tickets.iter().filter(|ticket| ticket.is_open()).collect::<Vec<_>>();
            if open.is_empty() {
                return None;
            }
            Some(OpenTicketSummary {
                name: customer.name.clone(),
                email: customer.email.clone(),
                phone: customer.phone.clone(),
                open_tickets: open.len(),
                issues: open
                    .iter()
                    .filter_map(|ticket| ticket.issue.clone())
                    .filter(|issue| !issue.is_empty())
                    .collect(),
            })
        })
        .collect()
}

pub const UPGRADE_STEPS: &str = "To upgrade, open the account dashboard, choose **Plan & Billing**, \
and select the tier you want. Confirm the payment method and submit the upgrade.";

/// `lookup` is `None` when no customer id was given and `Some(None)` when the
/// id was given but nothing was found.
pub fn upgrade_guidance(
    customer_id: CustomerId,
    lookup: Option<Option<&Customer>>,
    support_text: &str,
) -> String {
    let mut paragraphs = Vec::with_capacity(3);
    match lookup {
        Some(Some(customer)) => {
            paragraphs.push(format!(
                "Hello {} (Customer ID {customer_id}). Your account is currently marked as {}.",
                customer.name.as_deref().unwrap_or("there"),
                customer.status.as_deref().unwrap_or("unknown"),
            ));
            paragraphs.push(UPGRADE_STEPS.to_string());
        }
        Some(None) => paragraphs.push(format!(
            "I couldn't find customer {customer_id} in the records, but here is how you can upgrade:"
        )),
        None => paragraphs.push("Here's how to upgrade your account:".to_string()),
    }
    if !support_text.is_empty() {
        paragraphs.push(support_text.to_string());
    }
    paragraphs.join("\n\n").trim().to_string()
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// Confirmation of the new email followed by a numbered history listing.
pub fn update_summary(new_email: &str, history: &[Ticket]) -> String {
    let mut lines = vec![
        format!("Your email has been successfully updated to {new_email}.\n"),
        "Here is your ticket history:\n".to_string(),
    ];
    for (index, ticket) in history.iter().enumerate() {
        lines.push(format!(
            "{}. **Ticket ID:** {} \n   - **Issue:** {} \n   - **Status:** {} \n   - **Priority:** {} \n   - **Created At:** {}\n",
            index + 1,
            ticket.id,
            or_na(ticket.issue.as_deref()),
            or_na(ticket.status.as_deref()),
            or_na(ticket.priority.as_deref()),
            or_na(ticket.created_at.as_deref()),
        ));
    }
    lines.join("\n")
}
