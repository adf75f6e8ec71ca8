// ABOUTME: HTTP route registration for the inventory backend
// ABOUTME: Assembles per-resource routers with shared state and middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! HTTP routes.
//!
//! Each resource contributes its own `Router`; [`router`] merges them and
//! layers tracing, permissive CORS (the dashboard is served from another
//! origin), and request-id correlation. Handlers translate typed
//! [`crate::errors::AppError`] values into the JSON error envelope; the
//! domain layer never formats user-facing responses itself.

pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod reports;

use crate::database::Database;
use crate::middleware::request_id_middleware;
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state injected into every handler
pub struct AppState {
    /// Database handle; managers are built per-request from pool clones
    pub database: Database,
}

impl AppState {
    /// Create state around an initialized database
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }
}

/// Build the full application router
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes(state.clone()))
        .merge(ingredients::IngredientRoutes::routes(state.clone()))
        .merge(recipes::RecipeRoutes::routes(state.clone()))
        .merge(reports::ReportRoutes::routes(state))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
