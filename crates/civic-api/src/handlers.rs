//! API Handlers
use crate::error::ApiError;
use crate::extract::IssueBody;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use civic_core::{CivicResult, Issue, IssueStats, ServiceBanner, CIVIC_VERSION};
use serde_json::{json, Value};

type ApiResult<T> = Result<T, ApiError>;

/// Counts the outcome of `result` under `operation` and passes it through.
fn observed<T>(state: &AppState, operation: &str, result: CivicResult<T>) -> CivicResult<T> {
    state.metrics.observe(operation, result.is_ok());
    result
}

pub async fn banner(State(state): State<AppState>) -> Json<ServiceBanner> {
    Json(state.service.banner())
}

pub async fn list_issues(State(state): State<AppState>) -> ApiResult<Json<Vec<Issue>>> {
    let result = state.service.list_issues().await;
    observed(&state, "list_issues", result)
        .map(Json)
        .map_err(ApiError::read)
}

pub async fn create_issue(
    State(state): State<AppState>,
    payload: Result<IssueBody, ApiError>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    let IssueBody(fields) = payload.inspect_err(|_| state.metrics.observe("create_issue", false))?;

    let result = state.service.create_issue(fields).await;
    let issue = observed(&state, "create_issue", result).map_err(ApiError::write)?;
    state.metrics.issue_created();
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn update_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<IssueBody, ApiError>,
) -> ApiResult<Json<Issue>> {
    let IssueBody(fields) = payload.inspect_err(|_| state.metrics.observe("update_issue", false))?;

    let result = state.service.update_issue(&id, fields).await;
    observed(&state, "update_issue", result)
        .map(Json)
        .map_err(ApiError::write)
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<IssueStats>> {
    let result = state.service.stats().await;
    observed(&state, "stats", result)
        .map(Json)
        .map_err(ApiError::read)
}

pub async fn issues_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Issue>>> {
    let result = state.service.issues_by_category(&category).await;
    observed(&state, "issues_by_category", result)
        .map(Json)
        .map_err(ApiError::read)
}

pub async fn issues_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<Issue>>> {
    let result = state.service.issues_by_status(&status).await;
    observed(&state, "issues_by_status", result)
        .map(Json)
        .map_err(ApiError::read)
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": CIVIC_VERSION })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.encode().map_err(|err| {
        tracing::error!(error = %err, "metrics encoding failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
