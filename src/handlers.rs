// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP request handlers for the issue API.
//!
//! Each handler validates its input, calls exactly one storage operation,
//! and maps the result to a status code and JSON body. Error mapping lives
//! on [`Error`]: not-found becomes 404, invalid input 400, everything else
//! 500.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::{IssueUpdate, NewIssue, Storage};
use crate::types::{
    HealthResponse, IssueIdResponse, IssueResponse, NewIssueRequest, PriorityQuery, StatusQuery,
    UpdateIssueRequest,
};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for issues and comments.
    pub storage: Arc<dyn Storage>,
    /// When the server started (for uptime calculation).
    pub start_time: Instant,
}

impl AppState {
    /// Create handler state over a storage backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            start_time: Instant::now(),
        }
    }

    /// Server uptime in milliseconds.
    pub fn uptime_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}

/// Parse a path segment as an issue identifier.
fn parse_issue_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::InvalidRequest("invalid issue id format".to_string()))
}

/// Handle `POST /api/issue`: create a new issue.
pub async fn create_issue(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewIssueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssueIdResponse>)> {
    let Json(req) = payload.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    if req.summary.is_empty() {
        return Err(Error::InvalidRequest("summary is required".to_string()));
    }
    if req.description.is_empty() {
        return Err(Error::InvalidRequest("description is required".to_string()));
    }

    debug!(summary = %req.summary, priority = req.priority, "received issue creation request");

    let id = state
        .storage
        .create_issue(&NewIssue {
            summary: req.summary,
            description: req.description,
            priority: req.priority,
            assignee: req.assignee.filter(|a| !a.is_empty()),
        })
        .await?;

    info!(issue_id = id, "issue created");

    Ok((StatusCode::CREATED, Json(IssueIdResponse { id })))
}

/// Handle `GET /api/issue/{id}`: fetch a single issue.
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IssueResponse>> {
    let issue_id = parse_issue_id(&id)?;

    let issue = state.storage.get_issue(issue_id).await?;

    debug!(issue_id, "issue retrieved");

    Ok(Json(issue.into()))
}

/// Handle `GET /api/issues`: fetch all issues.
pub async fn list_issues(State(state): State<AppState>) -> Result<Json<Vec<IssueResponse>>> {
    let issues = state.storage.list_issues().await?;

    debug!(count = issues.len(), "issues retrieved");

    Ok(Json(issues.into_iter().map(Into::into).collect()))
}

/// Handle `GET /api/issues/status?status=`: filter issues by exact status.
pub async fn list_issues_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<IssueResponse>>> {
    let status = query
        .status
        .ok_or_else(|| Error::InvalidRequest("could not filter by status".to_string()))?;

    let issues = state.storage.list_issues_by_status(&status).await?;

    debug!(%status, count = issues.len(), "issues retrieved by status");

    Ok(Json(issues.into_iter().map(Into::into).collect()))
}

/// Handle `GET /api/issues/priority?start=&end=`: filter issues by priority
/// range. `start` defaults to 0; a missing `end` means no upper bound.
pub async fn list_issues_by_priority(
    State(state): State<AppState>,
    query: std::result::Result<Query<PriorityQuery>, QueryRejection>,
) -> Result<Json<Vec<IssueResponse>>> {
    let Query(range) =
        query.map_err(|_| Error::InvalidRequest("could not filter by priority".to_string()))?;

    let issues = state
        .storage
        .list_issues_by_priority(range.start, range.end)
        .await?;

    debug!(
        start = range.start,
        end = ?range.end,
        count = issues.len(),
        "issues retrieved by priority"
    );

    Ok(Json(issues.into_iter().map(Into::into).collect()))
}

/// Handle `PATCH /api/issue/{id}`: partially update an issue and optionally
/// append a comment.
pub async fn update_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateIssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>> {
    let issue_id = parse_issue_id(&id)?;
    let Json(req) = payload.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    debug!(issue_id, "received issue update request");

    let issue = state
        .storage
        .update_issue(
            issue_id,
            &IssueUpdate {
                summary: req.summary,
                description: req.description,
                assignee: req.assignee,
                status: req.status,
                priority: req.priority,
                comment: req.comment,
            },
        )
        .await?;

    info!(issue_id, "issue updated");

    Ok(Json(issue.into()))
}

/// Handle `DELETE /api/issue/{id}`: delete an issue.
///
/// Deleting an identifier that does not exist still returns 204.
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let issue_id = parse_issue_id(&id)?;

    state.storage.delete_issue(issue_id).await?;

    info!(issue_id, "issue deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Handle `GET /healthz`: report server and database liveness.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.storage.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_ms: state.uptime_ms(),
    })
}
