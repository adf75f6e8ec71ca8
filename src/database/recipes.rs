// ABOUTME: Recipe catalog database operations for bills-of-materials over stock
// ABOUTME: Transactional CRUD with ingredient reference validation at write time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Recipe catalog.
//!
//! Recipes reference ingredients by id. References are validated when a
//! recipe is created or updated, not continuously: soft-deleting a
//! referenced ingredient leaves the recipe definition intact and simply
//! drives its capability to zero. Duplicate ingredient lines in one request
//! are merged by summing their amounts before insert.

use crate::errors::{AppError, AppResult};
use crate::models::{Recipe, RecipeIngredient};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Partial update for a recipe
#[derive(Debug, Clone, Default)]
pub struct UpdateRecipeRequest {
    /// New name, if provided
    pub name: Option<String>,
    /// Replacement bill of materials, if provided
    pub ingredients: Option<Vec<RecipeIngredient>>,
}

/// Manager for recipe definitions
pub struct RecipeCatalog {
    pool: SqlitePool,
}

impl RecipeCatalog {
    /// Create a new recipe catalog over the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a recipe with its bill of materials
    ///
    /// Runs in one transaction: a validation failure leaves no partial
    /// recipe rows behind.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty name, empty line list,
    /// non-positive amount, or a reference to a missing/deleted ingredient.
    pub async fn create(&self, name: &str, lines: &[RecipeIngredient]) -> AppResult<Recipe> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Recipe name must not be empty"));
        }
        let merged = merge_lines(lines)?;

        let now = Utc::now();
        let id = Uuid::new_v4();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        validate_references(&mut tx, &merged).await?;

        sqlx::query(
            r"
            INSERT INTO recipes (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        insert_lines(&mut tx, id, &merged).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        Ok(Recipe {
            id,
            name: name.to_owned(),
            ingredients: merged,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a recipe with its lines
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe is absent.
    pub async fn get(&self, id: Uuid) -> AppResult<Recipe> {
        let row = sqlx::query(
            "SELECT id, name, created_at, updated_at FROM recipes WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?
        .ok_or_else(|| {
            AppError::not_found(format!("Recipe {id}")).with_resource_id(id.to_string())
        })?;

        let mut recipe = row_to_recipe(&row)?;
        recipe.ingredients = self.lines_for(id).await?;
        Ok(recipe)
    }

    /// List all recipes with their lines, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list(&self) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at, updated_at FROM recipes ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let mut recipes: Vec<Recipe> = rows
            .iter()
            .map(row_to_recipe)
            .collect::<AppResult<Vec<_>>>()?;

        let line_rows = sqlx::query(
            "SELECT recipe_id, ingredient_id, amount FROM recipe_ingredients",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipe lines: {e}")))?;

        let mut by_recipe: BTreeMap<Uuid, Vec<RecipeIngredient>> = BTreeMap::new();
        for row in &line_rows {
            let recipe_id = parse_uuid(row.get("recipe_id"))?;
            by_recipe
                .entry(recipe_id)
                .or_default()
                .push(row_to_line(row)?);
        }

        for recipe in &mut recipes {
            recipe.ingredients = by_recipe.remove(&recipe.id).unwrap_or_default();
        }

        Ok(recipes)
    }

    /// Apply a partial update, replacing lines atomically when provided
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing recipe and `ValidationError` under
    /// the same rules as [`Self::create`].
    pub async fn update(&self, id: Uuid, request: &UpdateRecipeRequest) -> AppResult<Recipe> {
        let current = self.get(id).await?;

        let name = match &request.name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("Recipe name must not be empty"));
                }
                name.to_owned()
            }
            None => current.name,
        };

        let merged = match &request.ingredients {
            Some(lines) => Some(merge_lines(lines)?),
            None => None,
        };

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE recipes SET name = $1, updated_at = $2 WHERE id = $3")
            .bind(&name)
            .bind(now.to_rfc3339())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        let ingredients = if let Some(merged) = merged {
            validate_references(&mut tx, &merged).await?;

            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to replace recipe lines: {e}")))?;

            insert_lines(&mut tx, id, &merged).await?;
            merged
        } else {
            current.ingredients
        };

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe update: {e}")))?;

        Ok(Recipe {
            id,
            name,
            ingredients,
            created_at: current.created_at,
            updated_at: now,
        })
    }

    /// Delete a recipe and its lines
    ///
    /// Consumption history is not touched: records reference ingredients,
    /// not recipes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe is absent.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe lines: {e}")))?;

        let done = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if done.rows_affected() == 0 {
            return Err(
                AppError::not_found(format!("Recipe {id}")).with_resource_id(id.to_string())
            );
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe delete: {e}")))?;
        Ok(())
    }

    /// Lines for one recipe
    async fn lines_for(&self, id: Uuid) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            "SELECT ingredient_id, amount FROM recipe_ingredients WHERE recipe_id = $1",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe lines: {e}")))?;

        rows.iter().map(row_to_line).collect()
    }
}

/// Merge duplicate ingredient lines by summing amounts, validating each
fn merge_lines(lines: &[RecipeIngredient]) -> AppResult<Vec<RecipeIngredient>> {
    if lines.is_empty() {
        return Err(AppError::validation(
            "Recipe must have at least one ingredient",
        ));
    }

    let mut merged: BTreeMap<Uuid, f64> = BTreeMap::new();
    for line in lines {
        if line.amount <= 0.0 || !line.amount.is_finite() {
            return Err(AppError::validation(format!(
                "Ingredient amount must be positive, got {} for {}",
                line.amount, line.ingredient_id
            )));
        }
        *merged.entry(line.ingredient_id).or_insert(0.0) += line.amount;
    }

    Ok(merged
        .into_iter()
        .map(|(ingredient_id, amount)| RecipeIngredient {
            ingredient_id,
            amount,
        })
        .collect())
}

/// Every referenced ingredient must exist and be active
async fn validate_references(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    lines: &[RecipeIngredient],
) -> AppResult<()> {
    for line in lines {
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM ingredients WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(line.ingredient_id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to validate ingredient: {e}")))?;

        if exists.is_none() {
            return Err(AppError::validation(format!(
                "Ingredient {} does not exist or was deleted",
                line.ingredient_id
            ))
            .with_resource_id(line.ingredient_id.to_string()));
        }
    }
    Ok(())
}

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: Uuid,
    lines: &[RecipeIngredient],
) -> AppResult<()> {
    for line in lines {
        sqlx::query(
            r"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(recipe_id.to_string())
        .bind(line.ingredient_id.to_string())
        .bind(line.amount)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert recipe line: {e}")))?;
    }
    Ok(())
}

fn parse_uuid(value: String) -> AppResult<Uuid> {
    Uuid::parse_str(&value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

/// Convert a database row to a `Recipe` without its lines
fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Recipe {
        id: parse_uuid(row.get("id"))?,
        name: row.get("name"),
        ingredients: Vec::new(),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}

/// Convert a database row to a `RecipeIngredient`
fn row_to_line(row: &SqliteRow) -> AppResult<RecipeIngredient> {
    Ok(RecipeIngredient {
        ingredient_id: parse_uuid(row.get("ingredient_id"))?,
        amount: row.get("amount"),
    })
}
