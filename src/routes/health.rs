// ABOUTME: Health check endpoint for liveness probes and dashboards
// ABOUTME: Reports service status and database reachability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

use crate::errors::AppError;
use crate::routes::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
    /// Whether the database answered a ping
    pub database: bool,
    /// Response timestamp
    pub timestamp: String,
    /// Service version
    pub version: String,
}

/// Health routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(state)
    }

    /// Handle GET /health
    async fn handle_health(
        State(state): State<Arc<AppState>>,
    ) -> Result<Response, AppError> {
        let database = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(state.database.pool())
            .await
            .is_ok();

        let response = HealthResponse {
            status: if database { "ok" } else { "degraded" }.to_owned(),
            database,
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        };

        let status = if database {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        Ok((status, Json(response)).into_response())
    }
}
