// ABOUTME: Capability calculator: how many batches of each recipe current stock allows
// ABOUTME: Pure per-recipe computation plus a one-snapshot batch report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Capability calculator.
//!
//! Capability of a recipe is the minimum over its lines of
//! `floor(available / required)`. A missing or soft-deleted ingredient
//! contributes zero available stock, never an error: zero capability is a
//! valid, reportable state. The batch report reads recipes and stock inside
//! one transaction so every recipe is measured against the same snapshot.

use crate::errors::{AppError, AppResult};
use crate::models::{CapabilityEntry, RecipeIngredient};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Maximum whole batches producible for one recipe given a stock snapshot.
///
/// Amounts are strictly positive by catalog invariant, so no quotient can
/// divide by zero.
#[must_use]
pub fn compute_capability(lines: &[RecipeIngredient], stock: &HashMap<Uuid, f64>) -> u64 {
    lines
        .iter()
        .map(|line| {
            let available = stock.get(&line.ingredient_id).copied().unwrap_or(0.0);
            let quotient = (available / line.amount).floor();
            if quotient.is_finite() && quotient > 0.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    quotient as u64
                }
            } else {
                0
            }
        })
        .min()
        .unwrap_or(0)
}

/// Batch capability queries over the full recipe catalog
pub struct CapabilityCalculator {
    pool: SqlitePool,
}

impl CapabilityCalculator {
    /// Create a new calculator over the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Capability of every recipe against one consistent stock snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn compute_all(&self) -> AppResult<Vec<CapabilityEntry>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin snapshot: {e}")))?;

        let recipe_rows = sqlx::query("SELECT id, name FROM recipes ORDER BY name ASC")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to read recipes: {e}")))?;

        let line_rows = sqlx::query(
            "SELECT recipe_id, ingredient_id, amount FROM recipe_ingredients",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read recipe lines: {e}")))?;

        let stock_rows = sqlx::query(
            "SELECT id, quantity FROM ingredients WHERE deleted_at IS NULL",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read stock snapshot: {e}")))?;

        // Read-only snapshot; nothing to commit.
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to close snapshot: {e}")))?;

        let mut stock: HashMap<Uuid, f64> = HashMap::with_capacity(stock_rows.len());
        for row in &stock_rows {
            stock.insert(parse_uuid(row.get("id"))?, row.get("quantity"));
        }

        let mut lines_by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
        for row in &line_rows {
            let recipe_id = parse_uuid(row.get("recipe_id"))?;
            lines_by_recipe
                .entry(recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    ingredient_id: parse_uuid(row.get("ingredient_id"))?,
                    amount: row.get("amount"),
                });
        }

        recipe_rows
            .iter()
            .map(|row| {
                let recipe_id = parse_uuid(row.get("id"))?;
                let lines = lines_by_recipe.remove(&recipe_id).unwrap_or_default();
                Ok(CapabilityEntry {
                    recipe_id,
                    name: row.get("name"),
                    possible: compute_capability(&lines, &stock),
                })
            })
            .collect()
    }
}

fn parse_uuid(value: String) -> AppResult<Uuid> {
    Uuid::parse_str(&value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient_id: Uuid, amount: f64) -> RecipeIngredient {
        RecipeIngredient {
            ingredient_id,
            amount,
        }
    }

    #[test]
    fn test_minimum_across_lines() {
        let flour = Uuid::new_v4();
        let eggs = Uuid::new_v4();

        // Flour 300g / 300g per batch = 1; eggs 2 / 3 per batch = 0
        let stock = HashMap::from([(flour, 300.0), (eggs, 2.0)]);
        let lines = vec![line(flour, 300.0), line(eggs, 3.0)];

        assert_eq!(compute_capability(&lines, &stock), 0);
    }

    #[test]
    fn test_exact_division() {
        let sugar = Uuid::new_v4();
        let stock = HashMap::from([(sugar, 1000.0)]);
        let lines = vec![line(sugar, 200.0)];

        assert_eq!(compute_capability(&lines, &stock), 5);
    }

    #[test]
    fn test_missing_ingredient_counts_as_zero() {
        let sugar = Uuid::new_v4();
        let stock = HashMap::new();
        let lines = vec![line(sugar, 200.0)];

        assert_eq!(compute_capability(&lines, &stock), 0);
    }

    #[test]
    fn test_monotonic_in_stock_and_amount() {
        let flour = Uuid::new_v4();
        let lines = vec![line(flour, 250.0)];

        let low = HashMap::from([(flour, 500.0)]);
        let high = HashMap::from([(flour, 1500.0)]);
        assert!(compute_capability(&lines, &low) <= compute_capability(&lines, &high));

        let greedier = vec![line(flour, 400.0)];
        assert!(compute_capability(&greedier, &high) <= compute_capability(&lines, &high));
    }

    #[test]
    fn test_fractional_stock_floors() {
        let butter = Uuid::new_v4();
        let stock = HashMap::from([(butter, 499.9)]);
        let lines = vec![line(butter, 100.0)];

        assert_eq!(compute_capability(&lines, &stock), 4);
    }
}
