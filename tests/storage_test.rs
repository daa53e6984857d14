// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Storage layer tests for tracker-server.
//!
//! These tests verify the correctness of the PostgreSQL CRUD operations.
//! They run against a real database and are skipped when no database URL is
//! configured. Other tests may share the database, so assertions filter on
//! per-test marker values rather than relying on global table state.

use sqlx::PgPool;
use tracker_server::error::Error;
use tracker_server::migrations;
use tracker_server::storage::{IssueUpdate, NewIssue, PgStorage, Storage};
use uuid::Uuid;

/// Skip test if database URL is not set
macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TRACKER_TEST_DATABASE_URL").is_err()
            && std::env::var("TRACKER_DATABASE_URL").is_err()
        {
            eprintln!(
                "Skipping test: TRACKER_TEST_DATABASE_URL or TRACKER_DATABASE_URL not set"
            );
            return;
        }
    };
}

async fn get_pool() -> Option<PgPool> {
    let database_url = std::env::var("TRACKER_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("TRACKER_DATABASE_URL"))
        .ok()?;
    let pool = PgPool::connect(&database_url).await.ok()?;
    migrations::run(&pool).await.ok()?;
    Some(pool)
}

fn new_issue(summary: &str, priority: i64) -> NewIssue {
    NewIssue {
        summary: summary.to_string(),
        description: "This is a description".to_string(),
        priority,
        assignee: None,
    }
}

/// Clean up test data (comments cascade with the issue).
async fn cleanup(pool: &PgPool, issue_ids: &[i64]) {
    for id in issue_ids {
        sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .ok();
    }
}

// ============================================================================
// Create / Retrieve
// ============================================================================

#[tokio::test]
async fn test_create_and_get_issue() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage
        .create_issue(&new_issue("S", 1))
        .await
        .expect("Failed to create issue");

    assert!(id > 0);

    let issue = storage.get_issue(id).await.expect("Failed to get issue");

    assert_eq!(issue.id, id);
    assert_eq!(issue.summary, "S");
    assert_eq!(issue.description, "This is a description");
    assert_eq!(issue.priority, 1);
    assert_eq!(issue.status, "");
    assert!(issue.assignee.is_none());
    assert!(issue.comments.is_empty());

    cleanup(&pool, &[id]).await;
}

#[tokio::test]
async fn test_create_issue_with_assignee() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage
        .create_issue(&NewIssue {
            assignee: Some("John Doe".to_string()),
            ..new_issue("assigned", 2)
        })
        .await
        .expect("Failed to create issue");

    let issue = storage.get_issue(id).await.expect("Failed to get issue");

    assert_eq!(issue.assignee.as_deref(), Some("John Doe"));

    cleanup(&pool, &[id]).await;
}

#[tokio::test]
async fn test_get_issue_not_found() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool);

    let err = storage.get_issue(i64::MAX).await.unwrap_err();

    assert!(matches!(err, Error::IssueNotFound(_)));
}

#[tokio::test]
async fn test_list_issues_contains_created() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let a = storage.create_issue(&new_issue("a", 1)).await.unwrap();
    let b = storage.create_issue(&new_issue("b", 2)).await.unwrap();

    let issues = storage.list_issues().await.expect("Failed to list issues");
    let ids: Vec<i64> = issues.iter().map(|i| i.id).collect();

    assert!(ids.contains(&a));
    assert!(ids.contains(&b));

    cleanup(&pool, &[a, b]).await;
}

// ============================================================================
// Filtered Queries
// ============================================================================

#[tokio::test]
async fn test_list_issues_by_status_exact_match() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    // Unique status markers keep this test independent of other rows.
    let marker = Uuid::new_v4().to_string();
    let lower = format!("open-{marker}");
    let upper = format!("Open-{marker}");

    let a = storage.create_issue(&new_issue("a", 1)).await.unwrap();
    let b = storage.create_issue(&new_issue("b", 1)).await.unwrap();

    storage
        .update_issue(
            a,
            &IssueUpdate {
                status: Some(lower.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    storage
        .update_issue(
            b,
            &IssueUpdate {
                status: Some(upper.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let matched = storage.list_issues_by_status(&lower).await.unwrap();

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, a);

    cleanup(&pool, &[a, b]).await;
}

#[tokio::test]
async fn test_list_issues_by_priority_range() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let marker = format!("priority-test-{}", Uuid::new_v4());
    let mut ids = Vec::new();
    for priority in [1, 3, 7] {
        let id = storage
            .create_issue(&new_issue("p", priority))
            .await
            .unwrap();
        storage
            .update_issue(
                id,
                &IssueUpdate {
                    status: Some(marker.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ids.push(id);
    }

    // No upper bound: everything with priority >= 2.
    let unbounded: Vec<i64> = storage
        .list_issues_by_priority(2, None)
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.status == marker)
        .map(|i| i.priority)
        .collect();

    assert_eq!(unbounded, vec![3, 7]);

    // Bounded: 2 <= priority <= 5.
    let bounded: Vec<i64> = storage
        .list_issues_by_priority(2, Some(5))
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.status == marker)
        .map(|i| i.priority)
        .collect();

    assert_eq!(bounded, vec![3]);

    cleanup(&pool, &ids).await;
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_only_status_preserves_other_fields() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage
        .create_issue(&NewIssue {
            assignee: Some("John Doe".to_string()),
            ..new_issue("original summary", 4)
        })
        .await
        .unwrap();

    let updated = storage
        .update_issue(
            id,
            &IssueUpdate {
                status: Some("in progress".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update issue");

    assert_eq!(updated.status, "in progress");
    assert_eq!(updated.summary, "original summary");
    assert_eq!(updated.description, "This is a description");
    assert_eq!(updated.priority, 4);
    assert_eq!(updated.assignee.as_deref(), Some("John Doe"));

    // The returned record matches what a fresh read sees.
    let fetched = storage.get_issue(id).await.unwrap();
    assert_eq!(fetched.status, "in progress");
    assert_eq!(fetched.summary, "original summary");

    cleanup(&pool, &[id]).await;
}

#[tokio::test]
async fn test_update_priority_zero_is_applied() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage.create_issue(&new_issue("p0", 5)).await.unwrap();

    let updated = storage
        .update_issue(
            id,
            &IssueUpdate {
                priority: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.priority, 0);

    cleanup(&pool, &[id]).await;
}

#[tokio::test]
async fn test_update_appends_comments_in_order() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage.create_issue(&new_issue("c", 1)).await.unwrap();

    let first = storage
        .update_issue(
            id,
            &IssueUpdate {
                comment: Some("first".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(first.comments.len(), 1);

    let second = storage
        .update_issue(
            id,
            &IssueUpdate {
                comment: Some("second".to_string()),
                status: Some("open".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let bodies: Vec<&str> = second.comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);

    // Both writes of the second update landed: status and comment.
    let fetched = storage.get_issue(id).await.unwrap();
    assert_eq!(fetched.status, "open");
    assert_eq!(fetched.comments.len(), 2);

    cleanup(&pool, &[id]).await;
}

#[tokio::test]
async fn test_update_missing_issue_not_found() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool);

    let err = storage
        .update_issue(
            i64::MAX,
            &IssueUpdate {
                status: Some("open".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::IssueNotFound(_)));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_issue_and_cascade() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool.clone());

    let id = storage.create_issue(&new_issue("d", 1)).await.unwrap();
    storage
        .update_issue(
            id,
            &IssueUpdate {
                comment: Some("to be cascaded".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    storage.delete_issue(id).await.expect("Failed to delete");

    let err = storage.get_issue(id).await.unwrap_err();
    assert!(matches!(err, Error::IssueNotFound(_)));

    // Comments went with the issue.
    let leftover: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE issue_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_delete_missing_issue_is_not_an_error() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool);

    storage
        .delete_issue(i64::MAX)
        .await
        .expect("Deleting a missing issue should succeed");
}

// ============================================================================
// Health Check
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    skip_if_no_db!();
    let pool = get_pool().await.expect("Failed to connect to database");
    let storage = PgStorage::new(pool);

    let healthy = storage.health_check().await.expect("Health check failed");

    assert!(healthy);
}
