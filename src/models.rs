// ABOUTME: Core domain types for the inventory and recipe system
// ABOUTME: Defines Ingredient, Recipe, RecipeIngredient, and ConsumptionRecord
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Domain models shared across the stock ledger, recipe catalog, and reports.
//!
//! All stored quantities are canonical grams (see [`crate::units`]). Soft
//! deletion is a tagged state rather than a bare nullable timestamp so the
//! active/deleted distinction is exhaustive at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IngredientStatus {
    /// Ingredient is available for recipes and stock operations
    #[default]
    Active,
    /// Ingredient was soft-deleted; quantity is retained for history joins
    Deleted {
        /// When the ingredient was soft-deleted
        deleted_at: DateTime<Utc>,
    },
}

impl IngredientStatus {
    /// Whether this ingredient participates in listings and new recipes
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Build from the stored nullable `deleted_at` column
    #[must_use]
    pub const fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(deleted_at) => Self::Deleted { deleted_at },
        }
    }
}

/// A raw material tracked by the stock ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: Uuid,
    /// Human label, unique among active ingredients
    pub name: String,
    /// Current quantity in canonical grams, never negative
    pub quantity: f64,
    /// Active or soft-deleted
    #[serde(flatten)]
    pub status: IngredientStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// One line of a recipe's bill of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Referenced ingredient
    pub ingredient_id: Uuid,
    /// Required amount per batch in canonical grams, strictly positive
    pub amount: f64,
}

/// A recipe: a named set of ingredient requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: Uuid,
    /// Recipe name
    pub name: String,
    /// Bill of materials, one line per ingredient
    pub ingredients: Vec<RecipeIngredient>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// An append-only record of a stock-depleting event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Ingredient that was consumed
    pub ingredient_id: Uuid,
    /// Amount consumed in canonical grams
    pub amount: f64,
    /// Why the stock was consumed (usually the recipe name)
    pub reason: String,
    /// When the consumption happened
    pub created_at: DateTime<Utc>,
}

/// One row of the capability report: how many batches of a recipe are producible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityEntry {
    /// Recipe identifier
    pub recipe_id: Uuid,
    /// Recipe name
    pub name: String,
    /// Maximum whole batches producible with current stock
    pub possible: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_deleted_at() {
        assert!(IngredientStatus::from_deleted_at(None).is_active());

        let at = Utc::now();
        let deleted = IngredientStatus::from_deleted_at(Some(at));
        assert_eq!(deleted, IngredientStatus::Deleted { deleted_at: at });
        assert!(!deleted.is_active());
    }

    #[test]
    fn test_ingredient_serializes_flat_status() {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name: "Farinha de Trigo".into(),
            quantity: 5000.0,
            status: IngredientStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&ingredient).unwrap_or_default();
        assert_eq!(json["state"], "active");
        assert_eq!(json["name"], "Farinha de Trigo");
    }
}
