// ABOUTME: Append-only consumption log for stock-depleting events
// ABOUTME: Records what was consumed, how much, why, and when
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Consumption log.
//!
//! Records are created only by preparation transactions and are never
//! updated or deleted. History survives ingredient soft-deletes and recipe
//! deletes.

use crate::errors::{AppError, AppResult};
use crate::models::ConsumptionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// A consumption record joined with its ingredient name for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionHistoryEntry {
    /// The underlying record
    #[serde(flatten)]
    pub record: ConsumptionRecord,
    /// Ingredient name at read time (present even for soft-deleted ingredients)
    pub ingredient_name: String,
}

/// Manager for the append-only consumption history
pub struct ConsumptionLog {
    pool: SqlitePool,
}

impl ConsumptionLog {
    /// Create a new consumption log over the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// History of consumption events, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn history(&self) -> AppResult<Vec<ConsumptionHistoryEntry>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.ingredient_id, c.amount, c.reason, c.created_at,
                   i.name AS ingredient_name
            FROM consumption c
            JOIN ingredients i ON i.id = c.ingredient_id
            ORDER BY c.created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read consumption history: {e}")))?;

        rows.iter().map(row_to_history_entry).collect()
    }
}

/// Append one record within an open transaction.
///
/// Called by the preparation transaction so records only become visible if
/// the matching stock decrements commit.
pub(crate) async fn append_in(
    conn: &mut SqliteConnection,
    ingredient_id: Uuid,
    amount: f64,
    reason: &str,
    at: DateTime<Utc>,
) -> AppResult<ConsumptionRecord> {
    let id = Uuid::new_v4();

    sqlx::query(
        r"
        INSERT INTO consumption (id, ingredient_id, amount, reason, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(id.to_string())
    .bind(ingredient_id.to_string())
    .bind(amount)
    .bind(reason)
    .bind(at.to_rfc3339())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to append consumption record: {e}")))?;

    Ok(ConsumptionRecord {
        id,
        ingredient_id,
        amount,
        reason: reason.to_owned(),
        created_at: at,
    })
}

/// Convert a database row to a `ConsumptionHistoryEntry`
fn row_to_history_entry(row: &SqliteRow) -> AppResult<ConsumptionHistoryEntry> {
    let id_str: String = row.get("id");
    let ingredient_id_str: String = row.get("ingredient_id");
    let created_at_str: String = row.get("created_at");

    Ok(ConsumptionHistoryEntry {
        record: ConsumptionRecord {
            id: Uuid::parse_str(&id_str)
                .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
            ingredient_id: Uuid::parse_str(&ingredient_id_str)
                .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
            amount: row.get("amount"),
            reason: row.get("reason"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
                .with_timezone(&Utc),
        },
        ingredient_name: row.get("ingredient_name"),
    })
}
