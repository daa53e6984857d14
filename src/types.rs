// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wire types for the issue API.
//!
//! Request and response bodies exchanged over HTTP. Storage records live in
//! [`crate::storage`]; the [`From`] impls here translate between the two.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Issue;

/// Request body for creating a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssueRequest {
    /// Issue description.
    pub description: String,
    /// Issue summary.
    pub summary: String,
    /// Issue priority.
    pub priority: i64,
    /// Optional assignee; absent means unassigned.
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Request body for updating an existing issue.
///
/// Every field is optional: an absent field leaves the stored value
/// unchanged. `comment`, when present, appends one comment to the issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateIssueRequest {
    /// New description, if any.
    pub description: Option<String>,
    /// New summary, if any.
    pub summary: Option<String>,
    /// New priority, if any.
    pub priority: Option<i64>,
    /// New assignee, if any.
    pub assignee: Option<String>,
    /// New status, if any.
    pub status: Option<String>,
    /// Comment to append, if any.
    pub comment: Option<String>,
}

/// Query parameters for filtering issues by status.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    /// Status to match exactly (case-sensitive).
    pub status: Option<String>,
}

/// Query parameters for filtering issues by priority range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriorityQuery {
    /// Lower bound (inclusive). Defaults to 0 when absent.
    pub start: i64,
    /// Upper bound (inclusive). Absent means no upper bound.
    pub end: Option<i64>,
}

/// Full issue representation returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    /// Issue identifier.
    pub id: i64,
    /// Issue description.
    pub description: String,
    /// Issue summary.
    pub summary: String,
    /// Issue status; empty string when never set.
    pub status: String,
    /// Assignee; empty string when unassigned.
    pub assignee: String,
    /// Creation timestamp (RFC 3339).
    #[serde(rename = "createDate")]
    pub create_date: DateTime<Utc>,
    /// Issue priority.
    pub priority: i64,
    /// Comments in insertion order.
    pub comments: Vec<CommentResponse>,
}

impl From<Issue> for IssueResponse {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            description: issue.description,
            summary: issue.summary,
            status: issue.status,
            assignee: issue.assignee.unwrap_or_default(),
            create_date: issue.created_at,
            priority: issue.priority,
            comments: issue
                .comments
                .into_iter()
                .map(|c| CommentResponse { comment: c.body })
                .collect(),
        }
    }
}

/// A single comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    /// Comment text.
    pub comment: String,
}

/// Response body returned when a new issue is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueIdResponse {
    /// Identifier assigned to the new issue.
    pub id: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the server is healthy (database reachable).
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Server uptime in milliseconds.
    pub uptime_ms: i64,
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorWrapper {
    /// The errors that occurred while handling the request.
    pub errors: Vec<StandardError>,
}

impl ErrorWrapper {
    /// Build an error envelope from an HTTP status and a description.
    pub fn from_status(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            errors: vec![StandardError {
                code: status.as_u16(),
                title: status.canonical_reason().unwrap_or("Unknown").to_string(),
                description: Some(description.into()),
            }],
        }
    }
}

/// A single error entry in an [`ErrorWrapper`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardError {
    /// Numeric error code (mirrors the HTTP status).
    pub code: u16,
    /// Short error title.
    pub title: String,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
