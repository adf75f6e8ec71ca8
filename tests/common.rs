// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database creation and seed helpers for stock and recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `fratelli_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use fratelli_server::{
    database::{recipes::RecipeCatalog, stock::StockLedger, Database},
    models::{Ingredient, Recipe, RecipeIngredient},
};
use std::sync::Once;
use tempfile::TempDir;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup.
///
/// Backed by a file in a temp directory rather than `sqlite::memory:` so
/// every pooled connection sees the same data; the returned guard keeps the
/// directory alive for the duration of the test.
pub async fn create_test_database() -> Result<(Database, TempDir)> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let database_url = format!("sqlite:{}", dir.path().join("test.db").display());
    let database = Database::new(&database_url).await?;
    Ok((database, dir))
}

/// Create an ingredient with the given canonical-gram quantity
pub async fn seed_ingredient(database: &Database, name: &str, quantity: f64) -> Result<Ingredient> {
    let ledger = StockLedger::new(database.pool().clone());
    Ok(ledger.create(name, quantity).await?)
}

/// Create a recipe from `(ingredient_id, grams_per_batch)` pairs
pub async fn seed_recipe(database: &Database, name: &str, lines: &[(Uuid, f64)]) -> Result<Recipe> {
    let catalog = RecipeCatalog::new(database.pool().clone());
    let lines: Vec<RecipeIngredient> = lines
        .iter()
        .map(|&(ingredient_id, amount)| RecipeIngredient {
            ingredient_id,
            amount,
        })
        .collect();
    Ok(catalog.create(name, &lines).await?)
}
