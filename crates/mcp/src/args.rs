use serde_json::{Map, Value};

use helpdesk_core::domain::customer::CustomerId;

use crate::{McpError, McpResult};

fn integer(key: &str, value: &Value) -> McpResult<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| McpError::Validation(format!("`{key}` must be an integer, got {value}")))
}

pub(crate) fn required_i64(args: &Map<String, Value>, key: &str) -> McpResult<i64> {
    match args.get(key) {
        None | Some(Value::Null) => Err(McpError::Validation(format!("missing argument `{key}`"))),
        Some(value) => integer(key, value),
    }
}

pub(crate) fn customer_id(args: &Map<String, Value>) -> McpResult<CustomerId> {
    required_i64(args, "customer_id").map(CustomerId)
}

pub(crate) fn optional_i64(args: &Map<String, Value>, key: &str) -> McpResult<Option<i64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integer(key, value).map(Some),
    }
}

pub(crate) fn optional_customer_id(args: &Map<String, Value>) -> McpResult<Option<CustomerId>> {
    optional_i64(args, "customer_id").map(|id| id.map(CustomerId))
}

/// Strings pass through; other scalars use their JSON text.
pub(crate) fn optional_str(args: &Map<String, Value>, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn required_str(args: &Map<String, Value>, key: &str) -> McpResult<String> {
    optional_str(args, key).ok_or_else(|| McpError::Validation(format!("missing argument `{key}`")))
}

pub(crate) fn object<'a>(
    args: &'a Map<String, Value>,
    keys: &[&str],
) -> McpResult<Option<&'a Map<String, Value>>> {
    for key in keys {
        match args.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) => return Ok(Some(map)),
            Some(other) => {
                return Err(McpError::Validation(format!("`{key}` must be an object, got {other}")))
            }
        }
    }
    Ok(None)
}

/// Tool arguments travel as JSON objects; anything else counts as empty.
pub(crate) fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{customer_id, into_map, object, optional_i64, required_str};
    use crate::McpError;

    #[test]
    fn customer_id_accepts_integers_and_numeric_strings() {
        assert_eq!(customer_id(&into_map(json!({"customer_id": 3}))).expect("id").0, 3);
        assert_eq!(customer_id(&into_map(json!({"customer_id": "12"}))).expect("id").0, 12);
        assert!(matches!(
            customer_id(&into_map(json!({"customer_id": "twelve"}))),
            Err(McpError::Validation(_))
        ));
        assert!(matches!(customer_id(&into_map(json!({}))), Err(McpError::Validation(_))));
    }

    #[test]
    fn optional_values_treat_null_as_absent() {
        let args = into_map(json!({"limit": null, "data": null, "fields": {"email": "a@b.io"}}));
        assert_eq!(optional_i64(&args, "limit").expect("limit"), None);
        assert!(object(&args, &["data", "fields"]).expect("object").is_some());
        assert!(required_str(&args, "issue").is_err());
    }
}
