// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for tracker-server.
//!
//! This module defines the storage abstraction and backend implementations.

pub mod mock;
pub mod postgres;

pub use self::mock::MemoryStorage;
pub use self::postgres::PgStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Issue record from the storage layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Issue {
    /// Unique identifier, assigned by storage on creation.
    pub id: i64,
    /// One-line summary.
    pub summary: String,
    /// Full description.
    pub description: String,
    /// Priority value supplied by the caller.
    pub priority: i64,
    /// Free-form status; empty string when never set.
    pub status: String,
    /// Assignee, if any.
    pub assignee: Option<String>,
    /// When the issue was created.
    pub created_at: DateTime<Utc>,
    /// Comments in insertion order. Hydrated separately from the issue row.
    #[sqlx(skip)]
    pub comments: Vec<Comment>,
}

/// A single comment attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text.
    pub body: String,
}

/// Fields for creating a new issue.
#[derive(Debug, Clone)]
pub struct NewIssue {
    /// One-line summary (required).
    pub summary: String,
    /// Full description (required).
    pub description: String,
    /// Priority value (required).
    pub priority: i64,
    /// Assignee; `None` stores NULL rather than an empty string.
    pub assignee: Option<String>,
}

/// Partial update applied to an existing issue.
///
/// `None` fields leave the stored value unchanged; `comment` appends one
/// comment in the same transaction as the field update.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    /// New summary, if any.
    pub summary: Option<String>,
    /// New description, if any.
    pub description: Option<String>,
    /// New assignee, if any.
    pub assignee: Option<String>,
    /// New status, if any.
    pub status: Option<String>,
    /// New priority, if any.
    pub priority: Option<i64>,
    /// Comment to append, if any.
    pub comment: Option<String>,
}

/// Storage interface used by the request handlers.
///
/// Implemented by [`PgStorage`] for production and [`MemoryStorage`] as a
/// test double.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a new issue and return its generated identifier.
    async fn create_issue(&self, new: &NewIssue) -> Result<i64>;

    /// Fetch a single issue with its comments.
    ///
    /// Fails with [`crate::error::Error::IssueNotFound`] when no row matches.
    async fn get_issue(&self, issue_id: i64) -> Result<Issue>;

    /// Fetch all issues, each with its comments.
    async fn list_issues(&self) -> Result<Vec<Issue>>;

    /// Fetch issues whose status matches exactly (case-sensitive).
    async fn list_issues_by_status(&self, status: &str) -> Result<Vec<Issue>>;

    /// Fetch issues with priority >= `start`, and <= `end` when a bound is
    /// given.
    async fn list_issues_by_priority(&self, start: i64, end: Option<i64>) -> Result<Vec<Issue>>;

    /// Apply a partial update and return the post-update issue.
    ///
    /// The field update and the optional comment append are committed
    /// atomically. Fails with [`crate::error::Error::IssueNotFound`] when
    /// the issue does not exist.
    async fn update_issue(&self, issue_id: i64, update: &IssueUpdate) -> Result<Issue>;

    /// Delete an issue and, transitively, its comments.
    ///
    /// Deleting an identifier that does not exist is not an error.
    async fn delete_issue(&self, issue_id: i64) -> Result<()>;

    /// Probe the backend for liveness.
    async fn health_check(&self) -> Result<bool>;
}

impl Issue {
    /// Apply a partial update to an in-memory record.
    ///
    /// Overwrites each field whose `Option` is set and appends the comment
    /// if one was supplied. Shared by both backends so the merge semantics
    /// cannot drift.
    pub fn apply(&mut self, update: &IssueUpdate) {
        if let Some(summary) = &update.summary {
            self.summary = summary.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(assignee) = &update.assignee {
            self.assignee = Some(assignee.clone());
        }
        if let Some(status) = &update.status {
            self.status = status.clone();
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(comment) = &update.comment {
            self.comments.push(Comment {
                body: comment.clone(),
            });
        }
    }
}
