//! HTTP surface of the helpdesk agents.
//!
//! - `POST /a2a/router/call`         route a `{tool, arguments}` call
//! - `POST /a2a/router/message`      route a `{role, content}` message
//! - `POST /a2a/data/call`           run a store tool
//! - `POST /a2a/support/call`        run a support tool
//! - `POST /a2a/data/message`        free text to the data agent
//! - `POST /a2a/support/message`     free text to the support agent
//! - `GET  /a2a/{agent}/agent_card`  capability card
//! - `POST /mcp`                     JSON-RPC tool server

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use helpdesk_agent::{CallReply, Message, RouteError, RouterAgent, ToolCall};
use helpdesk_core::errors::ApplicationError;
use helpdesk_mcp::{HelpdeskMcpServer, JsonRpcRequest, JsonRpcResponse, McpResult, SupportDesk};

use crate::bootstrap::Application;
use crate::cards::agent_card;
use crate::health;
use crate::messages;

#[derive(Clone)]
pub struct AppState {
    router: RouterAgent,
    store: HelpdeskMcpServer,
    support: SupportDesk,
}

impl AppState {
    pub fn new(router: RouterAgent, store: HelpdeskMcpServer, support: SupportDesk) -> Self {
        Self { router, store, support }
    }
}

/// Full service: agent routes plus `/health`.
pub fn app(application: &Application) -> Router {
    let state = AppState::new(
        application.router.clone(),
        application.store.clone(),
        application.support.clone(),
    );
    router(state).merge(health::router(application.db_pool.clone()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/a2a/router/call", post(router_call))
        .route("/a2a/router/message", post(router_message))
        .route("/a2a/data/call", post(data_call))
        .route("/a2a/support/call", post(support_call))
        .route("/a2a/data/message", post(data_message))
        .route("/a2a/support/message", post(support_message))
        .route("/a2a/{agent}/agent_card", get(card))
        .route("/mcp", post(mcp))
        .with_state(state)
}

async fn router_call(State(state): State<AppState>, Json(call): Json<ToolCall>) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "http.router.call",
        correlation_id = %correlation_id,
        tool = %call.tool,
        "router call received"
    );
    routed(state.router.call(&call, &correlation_id).await, &correlation_id)
}

async fn router_message(State(state): State<AppState>, Json(message): Json<Message>) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "http.router.message",
        correlation_id = %correlation_id,
        role = %message.role,
        "router message received"
    );
    routed(state.router.message(&message, &correlation_id).await, &correlation_id)
}

/// A failed plan never yields a partial answer: the caller gets 502 with the
/// trace recorded up to the failing step.
fn routed(result: Result<CallReply, RouteError>, correlation_id: &str) -> Response {
    match result {
        Ok(reply) => Json(reply.to_json()).into_response(),
        Err(error) => {
            let logs = error.logs().to_vec();
            let interface =
                ApplicationError::Integration(error.to_string()).into_interface(correlation_id);
            warn!(
                event_name = "http.router.failed",
                correlation_id = %correlation_id,
                error = %interface,
                "routing failed"
            );
            let body = json!({
                "error": interface.message(),
                "message": interface.user_message(),
                "correlation_id": interface.correlation_id(),
                "logs": logs,
            });
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

async fn data_call(State(state): State<AppState>, Json(call): Json<ToolCall>) -> Json<Value> {
    Json(agent_reply("data", &call.tool, state.store.call_tool(&call.tool, &call.arguments).await))
}

async fn support_call(State(state): State<AppState>, Json(call): Json<ToolCall>) -> Json<Value> {
    Json(agent_reply(
        "support",
        &call.tool,
        state.support.call_tool(&call.tool, &call.arguments).await,
    ))
}

async fn data_message(State(state): State<AppState>, Json(message): Json<Message>) -> Json<Value> {
    match messages::data_rule(&message.content) {
        Some(call) => data_call(State(state), Json(call)).await,
        None => Json(messages::unmatched()),
    }
}

async fn support_message(
    State(state): State<AppState>,
    Json(message): Json<Message>,
) -> Json<Value> {
    match messages::support_rule(&message.content) {
        Some(call) => support_call(State(state), Json(call)).await,
        None => Json(messages::unmatched()),
    }
}

/// Tool failures stay `200` with `{ok: false, error}`; the interface class is
/// only logged.
fn agent_reply(agent: &str, tool: &str, result: McpResult<Value>) -> Value {
    match result {
        Ok(value) => value,
        Err(error) => {
            let correlation_id = Uuid::new_v4().to_string();
            let interface = ApplicationError::from(&error).into_interface(correlation_id.as_str());
            warn!(
                event_name = "http.agent.tool_failed",
                correlation_id = %correlation_id,
                agent,
                tool,
                code = error.error_code(),
                error = %interface,
                "agent tool call failed"
            );
            json!({ "ok": false, "error": error.to_string(), "correlation_id": correlation_id })
        }
    }
}

async fn card(Path(agent): Path<String>) -> Response {
    match agent_card(&agent) {
        Some(card) => Json(card).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": format!("Unknown agent: {agent}") })))
            .into_response(),
    }
}

async fn mcp(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    Json(state.store.handle(request).await)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use helpdesk_agent::RouterAgent;
    use helpdesk_db::{connect_with_settings, migrations, SeedDataset};
    use helpdesk_mcp::{HelpdeskMcpServer, InProcessCollaborator, SupportDesk};

    use super::{router, AppState};

    fn state_for(store: HelpdeskMcpServer) -> AppState {
        let support = SupportDesk::new(store.tickets());
        let collaborator = InProcessCollaborator::new(store.clone(), support.clone());
        AppState::new(RouterAgent::new(Arc::new(collaborator)), store, support)
    }

    pub(crate) async fn seeded_state() -> AppState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrate");
        SeedDataset::load(&pool).await.expect("seed");
        state_for(HelpdeskMcpServer::from_pool(pool))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn router_call_returns_both_envelope_shapes() {
        let app = router(seeded_state().await);
        let (status, body) = send(
            app,
            "POST",
            "/a2a/router/call",
            Some(json!({"tool": "route_task", "arguments": {"text": "Get customer information for ID 1"}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "data");
        assert_eq!(body["route"], "router -> data");
        assert_eq!(body["final"]["customer"]["name"], "John Doe");
        assert_eq!(body["result"]["final"], body["final"]);
    }

    #[tokio::test]
    async fn router_message_and_unknown_tool() {
        let state = seeded_state().await;

        let (status, body) = send(
            router(state.clone()),
            "POST",
            "/a2a/router/message",
            Some(json!({"role": "user", "content": "I want a refund for my last order"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "support");

        let (status, body) = send(
            router(state),
            "POST",
            "/a2a/router/call",
            Some(json!({"tool": "summarize", "arguments": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "Unknown tool: summarize"}));
    }

    #[tokio::test]
    async fn null_arguments_route_with_defaults() {
        let (status, body) = send(
            router(seeded_state().await),
            "POST",
            "/a2a/router/call",
            Some(json!({"tool": "route_task", "arguments": null})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "data");
        assert_eq!(body["final"]["customer"]["name"], "John Doe");
    }

    #[tokio::test]
    async fn agent_messages_apply_their_rule_or_acknowledge() {
        let state = seeded_state().await;

        let (status, customer) = send(
            router(state.clone()),
            "POST",
            "/a2a/data/message",
            Some(json!({"role": "user", "content": "get customer 4"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(customer["customer"]["name"], "Alice Williams");

        let (_, resolution) = send(
            router(state.clone()),
            "POST",
            "/a2a/support/message",
            Some(json!({"role": "user", "content": "I've been charged twice, please refund"})),
        )
        .await;
        assert_eq!(resolution["intent"], "billing");

        let (_, note) = send(
            router(state),
            "POST",
            "/a2a/support/message",
            Some(json!({"role": "user", "content": "hello"})),
        )
        .await;
        assert_eq!(note["ok"], true);
    }

    #[tokio::test]
    async fn collaborator_failure_is_bad_gateway_with_truncated_trace() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("pool");
        let app = router(state_for(HelpdeskMcpServer::from_pool(pool)));

        let (status, body) = send(
            app,
            "POST",
            "/a2a/router/call",
            Some(json!({"tool": "route", "arguments": {"text": "customer 2 details"}})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["logs"], json!(["Router classified as DATA"]));
        assert!(body["correlation_id"].as_str().is_some_and(|id| id.len() == 36));
        assert!(body.get("final").is_none());
    }

    #[tokio::test]
    async fn agent_calls_return_results_or_error_bodies() {
        let state = seeded_state().await;

        let (_, customer) = send(
            router(state.clone()),
            "POST",
            "/a2a/data/call",
            Some(json!({"tool": "get_customer", "arguments": {"customer_id": 4}})),
        )
        .await;
        assert_eq!(customer["customer"]["name"], "Alice Williams");

        let (status, failure) = send(
            router(state.clone()),
            "POST",
            "/a2a/data/call",
            Some(json!({"tool": "simple_support_reply", "arguments": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(failure["ok"], false);
        assert_eq!(failure["error"], "Unknown tool: simple_support_reply");
        assert!(failure["correlation_id"].as_str().is_some_and(|id| id.len() == 36));

        let (_, report) = send(
            router(state),
            "POST",
            "/a2a/support/call",
            Some(json!({"tool": "tickets_report_for_customers", "arguments": {"customer_ids": [1]}})),
        )
        .await;
        assert_eq!(report["report"][0]["customer_id"], 1);
    }

    #[tokio::test]
    async fn agent_cards_and_mcp_endpoint() {
        let state = seeded_state().await;

        let (status, card) = send(router(state.clone()), "GET", "/a2a/support/agent_card", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["id"], "support-agent");

        let (status, _) = send(router(state.clone()), "GET", "/a2a/billing/agent_card", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, listed) = send(
            router(state),
            "POST",
            "/mcp",
            Some(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["result"]["tools"].as_array().map(Vec::len), Some(5));
    }
}
