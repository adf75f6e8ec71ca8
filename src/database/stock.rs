// ABOUTME: Stock ledger database operations for raw-material inventory
// ABOUTME: Owns ingredient quantity state with atomic, never-negative mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Stock ledger.
//!
//! The ledger exclusively owns ingredient quantities. Every decrement is a
//! single conditional `UPDATE ... WHERE quantity >= ?`, so concurrent
//! consumers can never drive stock negative regardless of what they read
//! beforehand.

use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, IngredientStatus};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Partial update for an ingredient
#[derive(Debug, Clone, Default)]
pub struct UpdateIngredientRequest {
    /// New name, if provided
    pub name: Option<String>,
    /// New absolute quantity in canonical grams, if provided
    pub quantity: Option<f64>,
}

/// Manager for ingredient stock state
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Create a new stock ledger over the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new ingredient with an initial quantity
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty name or negative quantity and
    /// `DuplicateName` when an active ingredient with that name exists.
    pub async fn create(&self, name: &str, initial_quantity: f64) -> AppResult<Ingredient> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Ingredient name must not be empty"));
        }
        if initial_quantity < 0.0 || !initial_quantity.is_finite() {
            return Err(AppError::validation(
                "Initial quantity must be a non-negative number",
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();

        let result = sqlx::query(
            r"
            INSERT INTO ingredients (id, name, quantity, deleted_at, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, $4, $4)
            ",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(initial_quantity)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Ingredient {
                id,
                name: name.to_owned(),
                quantity: initial_quantity,
                status: IngredientStatus::Active,
                created_at: now,
                updated_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::duplicate_name(name)),
            Err(e) => Err(AppError::database(format!("Failed to create ingredient: {e}"))),
        }
    }

    /// Get an active ingredient by id
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ingredient is absent or soft-deleted.
    pub async fn get(&self, id: Uuid) -> AppResult<Ingredient> {
        let row = sqlx::query(
            r"
            SELECT id, name, quantity, deleted_at, created_at, updated_at
            FROM ingredients
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.map(|r| row_to_ingredient(&r)).transpose()?.ok_or_else(|| {
            AppError::not_found(format!("Ingredient {id}")).with_resource_id(id.to_string())
        })
    }

    /// List active ingredients ordered by name ascending
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, quantity, deleted_at, created_at, updated_at
            FROM ingredients
            WHERE deleted_at IS NULL
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        rows.iter().map(row_to_ingredient).collect()
    }

    /// Apply a partial update to an active ingredient
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing ingredient, `ValidationError` for a
    /// bad name or quantity, and `DuplicateName` on a rename collision.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateIngredientRequest,
    ) -> AppResult<Ingredient> {
        let current = self.get(id).await?;

        let name = match &request.name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("Ingredient name must not be empty"));
                }
                name.to_owned()
            }
            None => current.name,
        };
        let quantity = match request.quantity {
            Some(quantity) => {
                if quantity < 0.0 || !quantity.is_finite() {
                    return Err(AppError::validation(
                        "Quantity must be a non-negative number",
                    ));
                }
                quantity
            }
            None => current.quantity,
        };

        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE ingredients
            SET name = $1, quantity = $2, updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
            ",
        )
        .bind(&name)
        .bind(quantity)
        .bind(now.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(Ingredient {
                id,
                name,
                quantity,
                status: IngredientStatus::Active,
                created_at: current.created_at,
                updated_at: now,
            }),
            Ok(_) => Err(AppError::not_found(format!("Ingredient {id}"))
                .with_resource_id(id.to_string())),
            Err(e) if is_unique_violation(&e) => Err(AppError::duplicate_name(name)),
            Err(e) => Err(AppError::database(format!("Failed to update ingredient: {e}"))),
        }
    }

    /// Add stock to an active ingredient
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a non-positive amount and `NotFound`
    /// for a missing or deleted ingredient.
    pub async fn increment(&self, id: Uuid, amount: f64) -> AppResult<()> {
        validate_positive_amount(amount)?;

        let done = sqlx::query(
            r"
            UPDATE ingredients
            SET quantity = quantity + $1, updated_at = $2
            WHERE id = $3 AND deleted_at IS NULL
            ",
        )
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to increment stock: {e}")))?;

        if done.rows_affected() == 0 {
            return Err(
                AppError::not_found(format!("Ingredient {id}")).with_resource_id(id.to_string())
            );
        }
        Ok(())
    }

    /// Remove stock from an active ingredient, never going below zero
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a non-positive amount, `NotFound` for a
    /// missing or deleted ingredient, and `InsufficientStock` when the
    /// ingredient holds less than `amount`.
    pub async fn decrement(&self, id: Uuid, amount: f64) -> AppResult<()> {
        validate_positive_amount(amount)?;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        decrement_in(&mut *conn, id, amount).await
    }

    /// Soft-delete an ingredient, keeping its quantity for history joins
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ingredient is absent or already deleted.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let done = sqlx::query(
            r"
            UPDATE ingredients
            SET deleted_at = $1, updated_at = $1
            WHERE id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete ingredient: {e}")))?;

        if done.rows_affected() == 0 {
            return Err(
                AppError::not_found(format!("Ingredient {id}")).with_resource_id(id.to_string())
            );
        }
        Ok(())
    }
}

/// Conditional decrement against any executor (pool or open transaction).
///
/// The `quantity >= ?` guard makes the check-then-subtract a single atomic
/// compare-and-subtract; zero affected rows is disambiguated into
/// `NotFound` vs `InsufficientStock` with a follow-up read.
pub(crate) async fn decrement_in(
    conn: &mut SqliteConnection,
    id: Uuid,
    amount: f64,
) -> AppResult<()> {
    let done = sqlx::query(
        r"
        UPDATE ingredients
        SET quantity = quantity - $1, updated_at = $2
        WHERE id = $3 AND deleted_at IS NULL AND quantity >= $1
        ",
    )
    .bind(amount)
    .bind(Utc::now().to_rfc3339())
    .bind(id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to decrement stock: {e}")))?;

    if done.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<f64> = sqlx::query_scalar(
        "SELECT quantity FROM ingredients WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to read stock: {e}")))?;

    match available {
        Some(available) => Err(AppError::insufficient_stock(format!(
            "Ingredient {id} holds {available}g, needs {amount}g"
        ))
        .with_resource_id(id.to_string())
        .with_details(serde_json::json!({ "required": amount, "available": available }))),
        None => Err(
            AppError::not_found(format!("Ingredient {id}")).with_resource_id(id.to_string())
        ),
    }
}

fn validate_positive_amount(amount: f64) -> AppResult<()> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(AppError::validation("Amount must be a positive number"));
    }
    Ok(())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Convert a database row to an `Ingredient`
fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let id_str: String = row.get("id");
    let deleted_at_str: Option<String> = row.get("deleted_at");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let deleted_at = deleted_at_str
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Ingredient {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        name: row.get("name"),
        quantity: row.get("quantity"),
        status: IngredientStatus::from_deleted_at(deleted_at),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
