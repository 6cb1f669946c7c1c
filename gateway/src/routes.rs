use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use switchboard_core::persona::{self, COMPANY_NAME, DEFAULT_SCENARIO};
use switchboard_core::{BreadcrumbLog, Orchestrator, PlatformError, ToolPlatform};

use crate::api::{DocsRequest, ErrorBody, ExecuteRequest, RunRequest, RunResponse, ScenarioList};

// Shared by every handler: the platform for passthrough calls, the loop for agent runs.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn ToolPlatform>,
    pub orchestrator: Arc<Orchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/fastn/tools", post(list_tools))
        .route("/api/fastn/execute", post(execute_tool))
        .route("/api/agent/run", post(run_agent))
        .route("/api/docs/query", post(query_docs))
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/scenarios/{key}", get(get_scenario))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> &'static str {
    "Switchboard Gateway: Operational"
}

async fn list_tools(State(state): State<AppState>) -> Response {
    match state.platform.fetch_tools().await {
        Ok(tools) => {
            info!("Returning {} tools", tools.len());
            Json(tools).into_response()
        }
        Err(e) => upstream_failure("Failed to fetch Fastn tools", e),
    }
}

async fn execute_tool(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            error!("Rejected execute body: {}", rejection.body_text());
            return (rejection.status(), Json(ErrorBody::new(rejection.body_text()))).into_response();
        }
    };

    let action_id = match payload.action_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return (StatusCode::BAD_REQUEST, Json(ErrorBody::new("actionId is required")))
                .into_response()
        }
    };

    info!("Executing action {}", action_id);
    match state.platform.execute_tool(action_id, payload.parameters).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => upstream_failure("Failed to execute Fastn tool", e),
    }
}

// The Orchestrator Handler
async fn run_agent(State(state): State<AppState>, Json(payload): Json<RunRequest>) -> Json<RunResponse> {
    info!("Agent requested: {}", payload.user_query);

    let log = BreadcrumbLog::new();
    let outcome = state.orchestrator.run_outcome(&payload.user_query, &log).await;

    Json(RunResponse {
        outcome,
        breadcrumbs: log.into_entries(),
    })
}

async fn query_docs(State(state): State<AppState>, Json(payload): Json<DocsRequest>) -> Json<RunResponse> {
    let log = BreadcrumbLog::new();
    let outcome = state.orchestrator.docs_query(&payload.question, &log).await;

    Json(RunResponse {
        outcome,
        breadcrumbs: log.into_entries(),
    })
}

async fn list_scenarios() -> Json<ScenarioList> {
    Json(ScenarioList {
        company_name: COMPANY_NAME,
        default_scenario: DEFAULT_SCENARIO,
        scenarios: persona::scenarios(),
    })
}

async fn get_scenario(Path(key): Path<String>) -> Response {
    match persona::scenario(&key) {
        Some(agents) => Json(agents).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!("Unknown scenario: {}", key))),
        )
            .into_response(),
    }
}

/// Upstream status and body go back to the caller verbatim; anything else is a 500.
fn upstream_failure(label: &str, err: PlatformError) -> Response {
    match err {
        PlatformError::Status { status, body } => {
            error!("{}: {} {}", label, status, body);
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (code, Json(ErrorBody::new(format!("{}: {} {}", label, status, body)))).into_response()
        }
        other => {
            error!("{}: {}", label, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal Server Error")),
            )
                .into_response()
        }
    }
}
