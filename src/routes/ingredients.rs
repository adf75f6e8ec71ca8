// ABOUTME: Route handlers for ingredient stock CRUD
// ABOUTME: REST endpoints over the stock ledger with unit normalization at the edge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Ingredient routes.
//!
//! Quantities on the wire are canonical grams unless the request carries a
//! `unit` tag, which is normalized before it reaches the ledger. Responses
//! include a human-friendly display quantity alongside the stored value.

use crate::{
    database::stock::{StockLedger, UpdateIngredientRequest},
    errors::AppError,
    models::Ingredient,
    routes::AppState,
    units::{self, DisplayQuantity, Unit},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response for an ingredient
#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientResponse {
    /// Unique identifier
    pub id: String,
    /// Ingredient name
    pub name: String,
    /// Stored quantity in canonical grams
    pub quantity: f64,
    /// Human-friendly rendering of the quantity
    pub display: DisplayQuantity,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.to_string(),
            display: units::to_display(ingredient.quantity),
            name: ingredient.name,
            quantity: ingredient.quantity,
            created_at: ingredient.created_at.to_rfc3339(),
            updated_at: ingredient.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating an ingredient
#[derive(Debug, Deserialize)]
pub struct CreateIngredientBody {
    /// Ingredient name
    pub name: String,
    /// Initial quantity, defaults to zero
    pub quantity: Option<f64>,
    /// Unit tag for the quantity, defaults to grams
    pub unit: Option<String>,
}

/// Request body for updating an ingredient
#[derive(Debug, Deserialize)]
pub struct UpdateIngredientBody {
    /// New name, if provided
    pub name: Option<String>,
    /// New absolute quantity, if provided
    pub quantity: Option<f64>,
    /// Unit tag for the quantity, defaults to grams
    pub unit: Option<String>,
}

/// Ingredient routes handler
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/ingredients", get(Self::handle_list))
            .route("/ingredients", post(Self::handle_create))
            .route("/ingredients/:id", put(Self::handle_update))
            .route("/ingredients/:id", delete(Self::handle_delete))
            .with_state(state)
    }

    fn ledger(state: &Arc<AppState>) -> StockLedger {
        StockLedger::new(state.database.pool().clone())
    }

    /// Parse an optional unit tag, defaulting to grams
    fn parse_unit(tag: Option<&str>) -> Result<Unit, AppError> {
        tag.map_or(Ok(Unit::Gram), Unit::parse)
    }

    /// Handle GET /ingredients - list active stock, name ascending
    async fn handle_list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let ingredients = Self::ledger(&state).list().await?;
        let response: Vec<IngredientResponse> =
            ingredients.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /ingredients - create an ingredient
    async fn handle_create(
        State(state): State<Arc<AppState>>,
        Json(body): Json<CreateIngredientBody>,
    ) -> Result<Response, AppError> {
        let unit = Self::parse_unit(body.unit.as_deref())?;
        let quantity = units::to_canonical(body.quantity.unwrap_or(0.0), unit);

        let ingredient = Self::ledger(&state).create(&body.name, quantity).await?;
        let response: IngredientResponse = ingredient.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PUT /ingredients/:id - partial update
    async fn handle_update(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateIngredientBody>,
    ) -> Result<Response, AppError> {
        let unit = Self::parse_unit(body.unit.as_deref())?;
        let request = UpdateIngredientRequest {
            name: body.name,
            quantity: body.quantity.map(|q| units::to_canonical(q, unit)),
        };

        let ingredient = Self::ledger(&state).update(id, &request).await?;
        let response: IngredientResponse = ingredient.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /ingredients/:id - soft delete
    async fn handle_delete(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        Self::ledger(&state).soft_delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
