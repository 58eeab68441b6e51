//! HTTP surface of the activity service

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use github_sdk::progress::LogSink;
use github_sdk::util::generate_request_id;
use github_sdk::{http_status_for, GitHubClient, GitHubError, ToolParams, ToolResult};

use crate::tools;

/// Track service start time for uptime reporting
static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state
pub struct AppState {
    pub client: GitHubClient,
}

impl AppState {
    pub fn new(client: GitHubClient) -> Self {
        Lazy::force(&START_TIME);
        Self { client }
    }
}

/// Health response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: &'static str,
    pub uptime_seconds: u64,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        service_name: "activity-service",
        uptime_seconds: START_TIME.elapsed().as_secs(),
    })
}

/// POST /tools/{name}
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<ToolResult>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = generate_request_id();
    log::info!("[{}] executing tool '{}'", request_id, name);

    match dispatch(&state.client, &name, params).await {
        Ok(tool_result) => {
            log::info!("[{}] tool '{}' succeeded", request_id, name);
            Ok(Json(tool_result))
        }
        Err(err) => {
            log::error!("[{}] tool '{}' failed: {}", request_id, name, err);
            Err(error_response(err))
        }
    }
}

/// Route a tool request to its implementation
pub async fn dispatch(
    client: &GitHubClient,
    name: &str,
    params: Value,
) -> Result<ToolResult, GitHubError> {
    let params = ToolParams::new(params)?;
    let sink = LogSink;

    match name {
        "get_commit_statistics" => tools::commit_statistics(client, &params, &sink).await,
        "get_developer_activity" => tools::developer_activity(client, &params, &sink).await,
        "get_branch_analysis" => tools::branch_analysis(client, &params, &sink).await,
        _ => Err(GitHubError::validation(format!("Unknown tool: {}", name))),
    }
}

fn error_response(err: GitHubError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(http_status_for(&err)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
        }),
    )
}
