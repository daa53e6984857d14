// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory storage for testing.
//!
//! A [`Storage`] implementation backed by a mutex-guarded map. Used by the
//! handler tests and anywhere a database-free backend is convenient.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::{Issue, IssueUpdate, NewIssue, Storage};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    issues: BTreeMap<i64, Issue>,
}

/// In-memory storage for testing.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
    /// If true, every operation fails with a database error.
    pub fail: bool,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage where every operation fails with a database error.
    pub fn failing() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail: true,
        }
    }

    fn check_fail(&self) -> Result<()> {
        if self.fail {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_issue(&self, new: &NewIssue) -> Result<i64> {
        self.check_fail()?;
        let mut inner = self.inner.lock().await;

        inner.next_id += 1;
        let id = inner.next_id;
        inner.issues.insert(
            id,
            Issue {
                id,
                summary: new.summary.clone(),
                description: new.description.clone(),
                priority: new.priority,
                status: String::new(),
                assignee: new.assignee.clone(),
                created_at: Utc::now(),
                comments: vec![],
            },
        );

        Ok(id)
    }

    async fn get_issue(&self, issue_id: i64) -> Result<Issue> {
        self.check_fail()?;
        let inner = self.inner.lock().await;

        inner
            .issues
            .get(&issue_id)
            .cloned()
            .ok_or(Error::IssueNotFound(issue_id))
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.check_fail()?;
        let inner = self.inner.lock().await;

        Ok(inner.issues.values().cloned().collect())
    }

    async fn list_issues_by_status(&self, status: &str) -> Result<Vec<Issue>> {
        self.check_fail()?;
        let inner = self.inner.lock().await;

        Ok(inner
            .issues
            .values()
            .filter(|issue| issue.status == status)
            .cloned()
            .collect())
    }

    async fn list_issues_by_priority(&self, start: i64, end: Option<i64>) -> Result<Vec<Issue>> {
        self.check_fail()?;
        let inner = self.inner.lock().await;

        Ok(inner
            .issues
            .values()
            .filter(|issue| issue.priority >= start && end.is_none_or(|e| issue.priority <= e))
            .cloned()
            .collect())
    }

    async fn update_issue(&self, issue_id: i64, update: &IssueUpdate) -> Result<Issue> {
        self.check_fail()?;
        let mut inner = self.inner.lock().await;

        let issue = inner
            .issues
            .get_mut(&issue_id)
            .ok_or(Error::IssueNotFound(issue_id))?;

        issue.apply(update);

        Ok(issue.clone())
    }

    async fn delete_issue(&self, issue_id: i64) -> Result<()> {
        self.check_fail()?;
        let mut inner = self.inner.lock().await;

        inner.issues.remove(&issue_id);

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }
}
