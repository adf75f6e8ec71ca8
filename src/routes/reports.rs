// ABOUTME: Route handlers for read-only reports: stock, capability, and history
// ABOUTME: Aggregated views for the dashboard over ledger, calculator, and log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Report routes.
//!
//! All three reports are read-only and safe to run concurrently with
//! writes; the capability report reads one consistent snapshot.

use crate::{
    capability::CapabilityCalculator,
    database::{consumption::ConsumptionLog, stock::StockLedger},
    errors::AppError,
    routes::{ingredients::IngredientResponse, AppState},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row of the history report
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntryResponse {
    /// Record identifier
    pub id: String,
    /// Consumed ingredient id
    pub ingredient_id: String,
    /// Ingredient name at read time
    pub ingredient_name: String,
    /// Amount consumed in canonical grams
    pub amount: f64,
    /// Why the stock was consumed
    pub reason: String,
    /// When the consumption happened
    pub created_at: String,
}

/// Report routes handler
pub struct ReportRoutes;

impl ReportRoutes {
    /// Create all report routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/reports/stock", get(Self::handle_stock))
            .route("/reports/capability", get(Self::handle_capability))
            .route("/reports/history", get(Self::handle_history))
            .with_state(state)
    }

    /// Handle GET /reports/stock - active stock ordered by name
    async fn handle_stock(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let ledger = StockLedger::new(state.database.pool().clone());
        let ingredients = ledger.list().await?;
        let response: Vec<IngredientResponse> =
            ingredients.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /reports/capability - producible batches per recipe
    async fn handle_capability(
        State(state): State<Arc<AppState>>,
    ) -> Result<Response, AppError> {
        let calculator = CapabilityCalculator::new(state.database.pool().clone());
        let capability = calculator.compute_all().await?;
        Ok((StatusCode::OK, Json(capability)).into_response())
    }

    /// Handle GET /reports/history - consumption events, newest first
    async fn handle_history(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let log = ConsumptionLog::new(state.database.pool().clone());
        let history = log.history().await?;

        let response: Vec<HistoryEntryResponse> = history
            .into_iter()
            .map(|entry| HistoryEntryResponse {
                id: entry.record.id.to_string(),
                ingredient_id: entry.record.ingredient_id.to_string(),
                ingredient_name: entry.ingredient_name,
                amount: entry.record.amount,
                reason: entry.record.reason,
                created_at: entry.record.created_at.to_rfc3339(),
            })
            .collect();

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
