// ABOUTME: Preparation transaction: convert stock into consumption records for N batches
// ABOUTME: All-or-nothing multi-ingredient decrement with append-only history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Preparation transaction.
//!
//! `prepare` runs entirely inside one database transaction: every line of
//! the recipe is decremented with a conditional update, and one consumption
//! record is appended per line. If any decrement fails the transaction is
//! dropped and rolled back, so partial depletion is never observable and
//! recorded consumption always matches the stock actually removed. The
//! capability pre-check only produces a friendlier error; the conditional
//! updates are what make racing prepares safe.

use crate::capability::compute_capability;
use crate::database::{consumption, retry, stock};
use crate::errors::{AppError, AppResult};
use crate::models::{ConsumptionRecord, RecipeIngredient};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Result of a successful preparation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Preparation {
    /// Recipe that was prepared
    pub recipe_id: Uuid,
    /// Recipe name at preparation time
    pub recipe_name: String,
    /// Number of batches produced
    pub batches: u64,
    /// One record per ingredient consumed
    pub records: Vec<ConsumptionRecord>,
}

/// Orchestrates "prepare N batches of recipe R"
pub struct PreparationService {
    pool: SqlitePool,
}

impl PreparationService {
    /// Create a new preparation service over the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Prepare `batches` batches of a recipe, consuming stock atomically
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for zero batches, `NotFound` for a missing
    /// recipe, and `InsufficientStock` when any ingredient cannot cover
    /// `amount * batches` - in which case no stock change is observable.
    pub async fn prepare(
        &self,
        recipe_id: Uuid,
        batches: u64,
        reason: Option<&str>,
    ) -> AppResult<Preparation> {
        if batches == 0 {
            return Err(AppError::validation("Batches must be at least 1"));
        }

        // A racing prepare can lose the SQLite write lock; re-running it
        // sees the committed stock and yields a proper domain answer.
        retry::retry_on_contention(|| self.prepare_once(recipe_id, batches, reason), 5).await
    }

    async fn prepare_once(
        &self,
        recipe_id: Uuid,
        batches: u64,
        reason: Option<&str>,
    ) -> AppResult<Preparation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin preparation: {e}")))?;

        let recipe_name: String = sqlx::query_scalar("SELECT name FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to load recipe: {e}")))?
            .ok_or_else(|| {
                AppError::not_found(format!("Recipe {recipe_id}"))
                    .with_resource_id(recipe_id.to_string())
            })?;

        let line_rows = sqlx::query(
            "SELECT ingredient_id, amount FROM recipe_ingredients WHERE recipe_id = $1",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to load recipe lines: {e}")))?;

        let lines: Vec<RecipeIngredient> = line_rows
            .iter()
            .map(|row| {
                let id_str: String = row.get("ingredient_id");
                Ok(RecipeIngredient {
                    ingredient_id: Uuid::parse_str(&id_str)
                        .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
                    amount: row.get("amount"),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        // Advisory pre-check against the transaction's own snapshot. The
        // conditional decrements below remain the atomicity guarantee.
        let mut stock_snapshot: HashMap<Uuid, f64> = HashMap::with_capacity(lines.len());
        for line in &lines {
            let quantity: Option<f64> = sqlx::query_scalar(
                "SELECT quantity FROM ingredients WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(line.ingredient_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to read stock: {e}")))?;
            if let Some(quantity) = quantity {
                stock_snapshot.insert(line.ingredient_id, quantity);
            }
        }

        let capability = compute_capability(&lines, &stock_snapshot);
        if batches > capability {
            return Err(AppError::insufficient_stock(format!(
                "Recipe '{recipe_name}' supports {capability} batches, requested {batches}"
            ))
            .with_resource_id(recipe_id.to_string())
            .with_details(serde_json::json!({
                "capability": capability,
                "requested": batches
            })));
        }

        // Dropping the transaction on any error below rolls back every
        // decrement already applied in this call.
        #[allow(clippy::cast_precision_loss)]
        let factor = batches as f64;
        let reason = reason.unwrap_or(&recipe_name);
        let now = Utc::now();
        let mut records = Vec::with_capacity(lines.len());

        for line in &lines {
            let consumed = line.amount * factor;
            stock::decrement_in(&mut *tx, line.ingredient_id, consumed).await?;
            records.push(
                consumption::append_in(&mut *tx, line.ingredient_id, consumed, reason, now)
                    .await?,
            );
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit preparation: {e}")))?;

        info!(
            recipe.id = %recipe_id,
            recipe.name = %recipe_name,
            batches = batches,
            ingredients = records.len(),
            "Recipe prepared"
        );

        Ok(Preparation {
            recipe_id,
            recipe_name,
            batches,
            records,
        })
    }
}
