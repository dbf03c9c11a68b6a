//! HTTP API gateway for taskloop.
//!
//! Exposes the agent over REST: service info, health, agent state and
//! the run endpoint. Built on Axum.

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use taskloop_agent::Agent;
use taskloop_config::{AppConfig, MAX_ITERATIONS_LIMIT};
use taskloop_core::agent::{AgentState, RunState, TraceEntry};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub agent: Arc<Agent>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS allowing any origin for GET and POST
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
        .route("/agent/state", get(state_handler))
        .route("/agent/run", post(run_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let agent = Arc::new(Agent::from_config(&config)?);
    info!(tools = agent.tools().len(), "Agent ready");

    let app = build_router(Arc::new(GatewayState { config, agent }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

#[derive(Serialize)]
struct InfoResponse {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: Vec<&'static str>,
    tools: Vec<String>,
}

async fn info_handler(State(state): State<SharedState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "taskloop",
        version: env!("CARGO_PKG_VERSION"),
        description: "Reasoning-and-acting agent with a tool registry",
        endpoints: vec!["GET /", "GET /health", "GET /agent/state", "POST /agent/run"],
        tools: state
            .agent
            .tools()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    tools: usize,
    memory_items: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tools: state.agent.tools().len(),
        memory_items: state.agent.memory().len().await,
    })
}

async fn state_handler(State(state): State<SharedState>) -> Json<AgentState> {
    Json(state.agent.state().await)
}

#[derive(Deserialize)]
struct RunRequest {
    input: String,
    #[serde(default)]
    max_iterations: Option<usize>,
}

#[derive(Serialize)]
struct RunResponse {
    run_id: String,
    result: String,
    state: RunState,
    iterations: usize,
    scratchpad: Vec<String>,
    trace: Vec<TraceEntry>,
    tools_used: Vec<String>,
    available_tools: Vec<String>,
    memory_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_steps: Option<usize>,
}

async fn run_handler(
    State(state): State<SharedState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Rejected run request");
        bad_request(format!("Invalid request body: {}", e.body_text()))
    })?;

    let input = request.input.trim();
    if input.is_empty() {
        return Err(bad_request("input must not be empty"));
    }

    let max_iterations = request
        .max_iterations
        .unwrap_or(state.config.agent.max_iterations)
        .clamp(1, MAX_ITERATIONS_LIMIT);

    info!(input_len = input.len(), max_iterations, "Run request received");
    let result = state.agent.run(input, max_iterations).await;
    let multi_step = result.is_multi_step();

    Ok(Json(RunResponse {
        scratchpad: result.scratchpad(),
        available_tools: state
            .agent
            .tools()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        memory_items: state.agent.memory().len().await,
        total_steps: multi_step.then_some(result.total_steps),
        completed_steps: multi_step.then_some(result.completed_steps),
        run_id: result.run_id,
        result: result.final_text,
        state: result.state,
        iterations: result.iteration_count,
        trace: result.trace,
        tools_used: result.tools_invoked,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let config = AppConfig::default();
        let agent = Arc::new(Agent::from_config(&config).unwrap());
        Arc::new(GatewayState { config, agent })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn run_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/agent/run")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tools"], 13);
        assert_eq!(json["memory_items"], 0);
    }

    #[tokio::test]
    async fn info_lists_tools() {
        let app = build_router(test_state());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let json = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["name"], "taskloop");
        assert_eq!(json["tools"][0], "calculator");
    }

    #[tokio::test]
    async fn run_single_step() {
        let app = build_router(test_state());
        let response = app
            .oneshot(run_request(r#"{"input": "what is 2 + 2"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["state"], "completed");
        assert_eq!(json["iterations"], 1);
        assert!(json["result"].as_str().unwrap().contains("= 4"));
        assert_eq!(json["tools_used"][0], "calculator(what is 2 + 2)");
        assert_eq!(json["scratchpad"][0], "User Request: what is 2 + 2");
        assert!(json.get("total_steps").is_none());
    }

    #[tokio::test]
    async fn run_multi_step_reports_steps() {
        let state = test_state();
        let app = build_router(state.clone());
        let response = app
            .oneshot(run_request(
                r#"{"input": "remember that my favorite color is blue then recall"}"#,
            ))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["total_steps"], 2);
        assert_eq!(json["completed_steps"], 2);
        assert_eq!(json["memory_items"], 1);
        assert_eq!(json["tools_used"][1], "memory_store(recall)");
        assert_eq!(state.agent.state().await.runs_completed, 1);
    }

    #[tokio::test]
    async fn max_iterations_is_clamped() {
        let app = build_router(test_state());
        let response = app
            .oneshot(run_request(r#"{"input": "what is 1/0", "max_iterations": 500}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["iterations"], MAX_ITERATIONS_LIMIT);
        assert_eq!(json["state"], "failed");
    }

    #[tokio::test]
    async fn empty_input_is_bad_request() {
        let app = build_router(test_state());
        let response = app.oneshot(run_request(r#"{"input": "   "}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let app = build_router(test_state());
        let response = app.oneshot(run_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn state_endpoint_reflects_runs() {
        let state = test_state();
        state.agent.run("analyze this", 3).await;

        let app = build_router(state);
        let req = Request::builder().uri("/agent/state").body(Body::empty()).unwrap();
        let json = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["runs_completed"], 1);
        assert_eq!(json["last_trace_size"], 1);
    }
}
