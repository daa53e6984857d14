// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL-backed storage implementation.

use sqlx::PgPool;

use crate::error::{Error, Result};

use super::{Comment, Issue, IssueUpdate, NewIssue, Storage};

/// PostgreSQL-backed storage provider.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Create a new PostgreSQL storage provider from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comment bodies for one issue, in insertion order.
    async fn fetch_comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM comments WHERE issue_id = $1 ORDER BY id")
                .bind(issue_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(bodies.into_iter().map(|body| Comment { body }).collect())
    }

    /// Hydrate the `comments` field on every issue in the list.
    async fn hydrate(&self, mut issues: Vec<Issue>) -> Result<Vec<Issue>> {
        for issue in &mut issues {
            issue.comments = self.fetch_comments(issue.id).await?;
        }
        Ok(issues)
    }
}

#[async_trait::async_trait]
impl Storage for PgStorage {
    async fn create_issue(&self, new: &NewIssue) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO issues (summary, description, priority, assignee)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new.summary)
        .bind(&new.description)
        .bind(new.priority)
        .bind(new.assignee.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_issue(&self, issue_id: i64) -> Result<Issue> {
        let mut issue = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, summary, description, priority, status, assignee, created_at
            FROM issues
            WHERE id = $1
            "#,
        )
        .bind(issue_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::IssueNotFound(issue_id))?;

        issue.comments = self.fetch_comments(issue_id).await?;

        Ok(issue)
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, summary, description, priority, status, assignee, created_at
            FROM issues
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(issues).await
    }

    async fn list_issues_by_status(&self, status: &str) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, summary, description, priority, status, assignee, created_at
            FROM issues
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(issues).await
    }

    async fn list_issues_by_priority(&self, start: i64, end: Option<i64>) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, summary, description, priority, status, assignee, created_at
            FROM issues
            WHERE priority >= $1
              AND ($2::BIGINT IS NULL OR priority <= $2)
            ORDER BY id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(issues).await
    }

    async fn update_issue(&self, issue_id: i64, update: &IssueUpdate) -> Result<Issue> {
        // Read-modify-write under a row lock; the field update and the
        // comment append commit together or not at all.
        let mut tx = self.pool.begin().await?;

        let mut issue = sqlx::query_as::<_, Issue>(
            r#"
            SELECT id, summary, description, priority, status, assignee, created_at
            FROM issues
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(issue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::IssueNotFound(issue_id))?;

        issue.apply(update);

        sqlx::query(
            r#"
            UPDATE issues
            SET summary = $1, description = $2, assignee = $3, status = $4, priority = $5
            WHERE id = $6
            "#,
        )
        .bind(&issue.summary)
        .bind(&issue.description)
        .bind(issue.assignee.as_deref())
        .bind(&issue.status)
        .bind(issue.priority)
        .bind(issue_id)
        .execute(&mut *tx)
        .await?;

        if let Some(comment) = &update.comment {
            sqlx::query("INSERT INTO comments (issue_id, body) VALUES ($1, $2)")
                .bind(issue_id)
                .bind(comment)
                .execute(&mut *tx)
                .await?;
        }

        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM comments WHERE issue_id = $1 ORDER BY id")
                .bind(issue_id)
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        issue.comments = bodies.into_iter().map(|body| Comment { body }).collect();

        Ok(issue)
    }

    async fn delete_issue(&self, issue_id: i64) -> Result<()> {
        // Comments go with the issue via ON DELETE CASCADE. Deleting a
        // missing id affects zero rows and is not an error.
        sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(issue_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(true)
    }
}
