use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::customer::CustomerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub i64);

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const OPEN_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "medium";

/// A support ticket as the record store reports it. Same pass-through rules as
/// [`Customer`](super::customer::Customer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status.as_deref().is_some_and(|status| status.eq_ignore_ascii_case(OPEN_STATUS))
    }

    pub fn has_priority(&self, priority: &str) -> bool {
        self.priority.as_deref().is_some_and(|value| value.eq_ignore_ascii_case(priority))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Ticket;

    fn ticket(status: serde_json::Value) -> Ticket {
        serde_json::from_value(json!({"id": 1, "issue": "Login fails", "status": status}))
            .expect("ticket decodes")
    }

    #[test]
    fn open_status_matches_regardless_of_case() {
        assert!(ticket(json!("open")).is_open());
        assert!(ticket(json!("OPEN")).is_open());
        assert!(!ticket(json!("closed")).is_open());
        assert!(!ticket(json!(null)).is_open());
    }
}
