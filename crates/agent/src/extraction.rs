use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use helpdesk_core::domain::customer::CustomerId;

use crate::classifier::Intent;

/// Typed fields pulled from one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entities {
    pub customer_id: CustomerId,
    pub new_email: String,
}

impl Entities {
    /// Customer id `0` stands for "no customer given".
    pub fn has_customer(&self) -> bool {
        self.customer_id.0 != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntentDefaults {
    pub customer_id: i64,
    pub new_email: &'static str,
}

pub const DEFAULT_NEW_EMAIL: &str = "new@email.com";

impl IntentDefaults {
    pub fn for_intent(intent: Intent) -> Self {
        let customer_id = match intent {
            Intent::MultiCoord => 0,
            Intent::Data | Intent::MultiUpdate | Intent::Support | Intent::MultiOpen => 1,
        };
        Self { customer_id, new_email: DEFAULT_NEW_EMAIL }
    }
}

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id\s+([0-9]+)").expect("static pattern"));

static CUSTOMER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"customer\s+([0-9]+)").expect("static pattern"));

static NEW_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"update my email to (\S+)").expect("static pattern"));

fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern.captures(text).and_then(|captures| captures.get(1)).map(|found| found.as_str())
}

fn customer_id_from_text(lowered: &str) -> Option<i64> {
    [&*ID_RE, &*CUSTOMER_RE]
        .into_iter()
        .find_map(|pattern| first_capture(pattern, lowered).and_then(|digits| digits.parse().ok()))
}

fn customer_id_from_arguments(arguments: &Map<String, Value>) -> Option<i64> {
    match arguments.get("customer_id")? {
        Value::Number(number) => number.as_i64().or_else(|| integral(number.as_f64()?)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// `5.0` is an id; `5.5` is not.
fn integral(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

/// Never fails: anything the text and arguments do not supply comes from the
/// intent's defaults.
pub fn extract(intent: Intent, text: &str, arguments: &Map<String, Value>) -> Entities {
    let defaults = IntentDefaults::for_intent(intent);
    let lowered = text.to_lowercase();

    let customer_id = customer_id_from_text(&lowered)
        .or_else(|| customer_id_from_arguments(arguments))
        .unwrap_or(defaults.customer_id);

    let new_email = first_capture(&NEW_EMAIL_RE, &lowered)
        .map(str::to_string)
        .or_else(|| arguments.get("new_email").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| defaults.new_email.to_string());

    Entities { customer_id: CustomerId(customer_id), new_email }
}
