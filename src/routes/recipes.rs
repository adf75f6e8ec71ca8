// ABOUTME: Route handlers for recipe CRUD and recipe preparation
// ABOUTME: REST endpoints over the recipe catalog and the preparation transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Recipe routes.
//!
//! Recipe amounts accept an optional per-line `unit` tag and are stored in
//! canonical grams. `POST /recipes/:id/prepare` runs the all-or-nothing
//! preparation transaction and returns the consumption it recorded.

use crate::{
    database::recipes::{RecipeCatalog, UpdateRecipeRequest},
    errors::AppError,
    models::{Recipe, RecipeIngredient},
    preparation::{Preparation, PreparationService},
    routes::AppState,
    units::{self, Unit},
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

/// One recipe line on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeLineBody {
    /// Referenced ingredient id
    pub ingredient_id: Uuid,
    /// Required amount per batch
    pub amount: f64,
    /// Unit tag for the amount, defaults to grams
    pub unit: Option<String>,
}

/// Request body for creating a recipe
#[derive(Debug, Deserialize)]
pub struct CreateRecipeBody {
    /// Recipe name
    pub name: String,
    /// Bill of materials
    pub ingredients: Vec<RecipeLineBody>,
}

/// Request body for updating a recipe
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeBody {
    /// New name, if provided
    pub name: Option<String>,
    /// Replacement bill of materials, if provided
    pub ingredients: Option<Vec<RecipeLineBody>>,
}

/// Request body for preparing a recipe
#[derive(Debug, Deserialize)]
pub struct PrepareBody {
    /// Number of batches to produce
    pub batches: u64,
    /// Optional reason recorded in the consumption log
    pub reason: Option<String>,
}

/// Response for a recipe
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Unique identifier
    pub id: String,
    /// Recipe name
    pub name: String,
    /// Bill of materials in canonical grams
    pub ingredients: Vec<RecipeIngredient>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            name: recipe.name,
            ingredients: recipe.ingredients,
            created_at: recipe.created_at.to_rfc3339(),
            updated_at: recipe.updated_at.to_rfc3339(),
        }
    }
}

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/recipes", get(Self::handle_list))
            .route("/recipes", post(Self::handle_create))
            .route("/recipes/:id", get(Self::handle_get))
            .route("/recipes/:id", put(Self::handle_update))
            .route("/recipes/:id", delete(Self::handle_delete))
            .route("/recipes/:id/prepare", post(Self::handle_prepare))
            .with_state(state)
    }

    fn catalog(state: &Arc<AppState>) -> RecipeCatalog {
        RecipeCatalog::new(state.database.pool().clone())
    }

    /// Normalize wire lines to canonical-gram recipe lines
    fn normalize_lines(lines: &[RecipeLineBody]) -> Result<Vec<RecipeIngredient>, AppError> {
        lines
            .iter()
            .map(|line| {
                let unit = line.unit.as_deref().map_or(Ok(Unit::Gram), Unit::parse)?;
                Ok(RecipeIngredient {
                    ingredient_id: line.ingredient_id,
                    amount: units::to_canonical(line.amount, unit),
                })
            })
            .collect()
    }

    /// Handle GET /recipes - list all recipes with lines
    async fn handle_list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let recipes = Self::catalog(&state).list().await?;
        let response: Vec<RecipeResponse> = recipes.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /recipes - create a recipe
    async fn handle_create(
        State(state): State<Arc<AppState>>,
        Json(body): Json<CreateRecipeBody>,
    ) -> Result<Response, AppError> {
        let lines = Self::normalize_lines(&body.ingredients)?;
        let recipe = Self::catalog(&state).create(&body.name, &lines).await?;
        let response: RecipeResponse = recipe.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /recipes/:id
    async fn handle_get(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let recipe = Self::catalog(&state).get(id).await?;
        let response: RecipeResponse = recipe.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /recipes/:id - partial update
    async fn handle_update(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateRecipeBody>,
    ) -> Result<Response, AppError> {
        let ingredients = match &body.ingredients {
            Some(lines) => Some(Self::normalize_lines(lines)?),
            None => None,
        };
        let request = UpdateRecipeRequest {
            name: body.name,
            ingredients,
        };

        let recipe = Self::catalog(&state).update(id, &request).await?;
        let response: RecipeResponse = recipe.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /recipes/:id
    async fn handle_delete(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        Self::catalog(&state).delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /recipes/:id/prepare - consume stock for N batches
    async fn handle_prepare(
        State(state): State<Arc<AppState>>,
        Path(id): Path<Uuid>,
        Json(body): Json<PrepareBody>,
    ) -> Result<Response, AppError> {
        let service = PreparationService::new(state.database.pool().clone());
        let preparation: Preparation =
            service.prepare(id, body.batches, body.reason.as_deref()).await?;
        Ok((StatusCode::OK, Json(preparation)).into_response())
    }
}
