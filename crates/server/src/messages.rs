//! Free-text messages to the data and support agents.
//!
//! Each agent maps a message onto one of its own tools with a single rule;
//! a message no rule matches is acknowledged without a call.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use helpdesk_agent::ToolCall;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,10})\b").expect("static pattern"));

const SUPPORT_TRIGGERS: [&str; 2] = ["refund", "charged twice"];

fn call(tool: &str, arguments: Value) -> ToolCall {
    let arguments = match arguments {
        Value::Object(arguments) => arguments,
        _ => Map::new(),
    };
    ToolCall { tool: tool.to_string(), arguments }
}

/// The first standalone number is a customer id.
pub fn data_rule(content: &str) -> Option<ToolCall> {
    let id = NUMBER_RE.captures(content)?.get(1)?.as_str().parse::<i64>().ok()?;
    Some(call("get_customer", json!({ "customer_id": id })))
}

pub fn support_rule(content: &str) -> Option<ToolCall> {
    let lowered = content.to_lowercase();
    SUPPORT_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
        .then(|| call("suggest_resolution", json!({ "text": content })))
}

pub fn unmatched() -> Value {
    json!({ "ok": true, "note": "Message received (no auto rule matched)." })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{data_rule, support_rule};

    #[test]
    fn data_rule_takes_first_standalone_number() {
        let call = data_rule("get customer 42 and 7").expect("call");
        assert_eq!(call.tool, "get_customer");
        assert_eq!(call.arguments["customer_id"], json!(42));

        assert!(data_rule("order abc123 is late").is_none());
        assert!(data_rule("hello there").is_none());
    }

    #[test]
    fn support_rule_matches_refund_and_double_charge() {
        let call = support_rule("I was Charged Twice for this").expect("call");
        assert_eq!(call.tool, "suggest_resolution");
        assert_eq!(call.arguments["text"], "I was Charged Twice for this");

        assert!(support_rule("Please REFUND me").is_some());
        assert!(support_rule("where is my parcel").is_none());
    }
}
