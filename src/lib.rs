// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tracker Server - Issue Tracking HTTP API
//!
//! This crate provides a CRUD REST API for tracking issues: work items with
//! a summary, description, status, priority, assignee, and an append-only
//! sequence of comments, backed by PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   HTTP   ┌────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, request id)      │
//! └──────────┘ <─────── │    └─ handlers.rs  (validation, AppState)  │
//!                       │            │                               │
//!                       │            │ Storage trait                 │
//!                       │            ▼                               │
//!                       │  storage/postgres.rs  (PgStorage, sqlx)    │
//!                       │  storage/mock.rs      (MemoryStorage)      │
//!                       └────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//!                              PostgreSQL
//!                         (issues, comments)
//! ```
//!
//! # HTTP Surface
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/issue` | Create an issue |
//! | `GET` | `/api/issue/{id}` | Fetch one issue with its comments |
//! | `GET` | `/api/issues` | Fetch all issues |
//! | `GET` | `/api/issues/status?status=` | Filter by exact status |
//! | `GET` | `/api/issues/priority?start=&end=` | Filter by priority range |
//! | `PATCH` | `/api/issue/{id}` | Partial update, optional comment append |
//! | `DELETE` | `/api/issue/{id}` | Delete an issue (idempotent) |
//! | `GET` | `/healthz` | Liveness probe |
//!
//! Partial updates use explicit optional fields: an absent field leaves the
//! stored value unchanged. The priority filter's upper bound is likewise
//! optional; absent means unbounded. The update's field write and comment
//! append commit in one transaction.
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TRACKER_DATABASE_URL` | Yes* | - | PostgreSQL connection string |
//! | `DATABASE_URL` | Yes* | - | Fallback if above not set |
//! | `TRACKER_HTTP_PORT` | No | `8080` | HTTP listen port |
//!
//! # Modules
//!
//! - [`config`]: Server configuration from environment variables
//! - [`error`]: Error types and HTTP status mapping
//! - [`handlers`]: HTTP request handlers
//! - [`migrations`]: Embedded database migrations
//! - [`server`]: Router construction and middleware stack
//! - [`storage`]: Storage trait, PostgreSQL backend, in-memory test double
//! - [`types`]: Request/response wire types

#![deny(missing_docs)]

/// Server configuration loaded from environment variables.
pub mod config;

/// Error types and HTTP status mapping.
pub mod error;

/// HTTP request handlers.
pub mod handlers;

/// Embedded database migrations.
pub mod migrations;

/// Router construction and middleware stack.
pub mod server;

/// Storage trait, PostgreSQL backend, and in-memory test double.
pub mod storage;

/// Request/response wire types.
pub mod types;

pub use config::Config;
pub use error::Error;
