// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP server setup for the issue API.
//!
//! Builds the axum router and wires the middleware stack: every request
//! gets a generated `x-request-id` before the trace span is created, so the
//! span (and everything logged inside it) carries the correlation id, and
//! the id is propagated onto the response.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{self, AppState};

/// Build the axum router with all routes and middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/issue", post(handlers::create_issue))
        .route(
            "/api/issue/{id}",
            get(handlers::get_issue)
                .patch(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        .route("/api/issues", get(handlers::list_issues))
        .route("/api/issues/status", get(handlers::list_issues_by_status))
        .route(
            "/api/issues/priority",
            get(handlers::list_issues_by_priority),
        )
        .route("/healthz", get(handlers::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Run the server on the given listener until a shutdown signal arrives.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(address = %addr, "HTTP server starting");

    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
