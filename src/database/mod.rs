// ABOUTME: Database management for the inventory backend
// ABOUTME: Owns the SQLite pool and runs idempotent schema migrations at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! # Database Management
//!
//! This module provides database functionality for the Fratelli backend.
//! Each domain area gets a manager struct owning a pool clone; the
//! [`Database`] handle is created once at startup and injected into every
//! manager, so there is no hidden process-wide connection state.

pub mod consumption;
pub mod recipes;
pub mod retry;
pub mod stock;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database handle for ingredient, recipe, and consumption storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && database_url != "sqlite::memory:"
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_ingredients().await?;
        self.migrate_recipes().await?;
        self.migrate_consumption().await?;
        Ok(())
    }

    /// Create ingredient tables
    async fn migrate_ingredients(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                quantity REAL NOT NULL DEFAULT 0 CHECK (quantity >= 0),
                deleted_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Name uniqueness applies to active ingredients only; a soft-deleted
        // ingredient frees its name for reuse.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_ingredients_active_name
             ON ingredients(name) WHERE deleted_at IS NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create recipe tables
    async fn migrate_recipes(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // One line per (recipe, ingredient); duplicate request lines are
        // merged before insert.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id TEXT NOT NULL REFERENCES ingredients(id),
                amount REAL NOT NULL CHECK (amount > 0),
                PRIMARY KEY (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe
             ON recipe_ingredients(recipe_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the append-only consumption table
    async fn migrate_consumption(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS consumption (
                id TEXT PRIMARY KEY,
                ingredient_id TEXT NOT NULL REFERENCES ingredients(id),
                amount REAL NOT NULL CHECK (amount > 0),
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_consumption_created_at
             ON consumption(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
