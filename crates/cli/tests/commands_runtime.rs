use std::env;
use std::sync::{Mutex, OnceLock};

use helpdesk_cli::commands::route::RouteRequest;
use helpdesk_cli::commands::{migrate, route, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("HELPDESK_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("HELPDESK_DATABASE_URL", "postgres://localhost/helpdesk")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("configuration failure:")));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = database_url(&dir);

    with_env(&[("HELPDESK_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["message"], "seeded 8 customers and 10 tickets");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        assert_eq!(first_payload["message"], parse_payload(&second.output)["message"]);
    });
}

#[test]
fn route_prints_envelope_for_seeded_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = database_url(&dir);

    with_env(&[("HELPDESK_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = route::run(RouteRequest {
            text: "Show me all active customers who have open tickets".to_string(),
            ..RouteRequest::default()
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "route");
        assert!(payload.get("message").is_none());
        let envelope = &payload["envelope"];
        assert_eq!(envelope["scenario"], "multi-intent");
        assert_eq!(envelope["final"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn route_with_forced_unknown_label_takes_support_fallback() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = database_url(&dir);

    with_env(&[("HELPDESK_DATABASE_URL", url.as_str())], || {
        let result = route::run(RouteRequest {
            text: "please look into this".to_string(),
            customer_id: Some(2),
            intent: Some("escalate".to_string()),
            ..RouteRequest::default()
        });
        assert_eq!(result.exit_code, 0);

        let envelope = parse_payload(&result.output)["envelope"].clone();
        assert_eq!(envelope["scenario"], "support");
        assert_eq!(envelope["route"], "router -> support");
    });
}

fn database_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("helpdesk.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "HELPDESK_DATABASE_URL",
        "HELPDESK_DATABASE_MAX_CONNECTIONS",
        "HELPDESK_DATABASE_TIMEOUT_SECS",
        "HELPDESK_SERVER_BIND_ADDRESS",
        "HELPDESK_SERVER_PORT",
        "HELPDESK_AGENTS_MODE",
        "HELPDESK_AGENTS_DATA_BASE_URL",
        "HELPDESK_AGENTS_SUPPORT_BASE_URL",
        "HELPDESK_AGENTS_LOOKUP_TIMEOUT_SECS",
        "HELPDESK_AGENTS_FANOUT_TIMEOUT_SECS",
        "HELPDESK_LOGGING_LEVEL",
        "HELPDESK_LOGGING_FORMAT",
        "HELPDESK_LOG_LEVEL",
        "HELPDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
