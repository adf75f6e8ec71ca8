// ABOUTME: Integration tests for the stock ledger
// ABOUTME: Covers CRUD, the non-negativity invariant, and soft-delete semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Stock ledger integration tests

mod common;

use anyhow::Result;
use fratelli_server::database::stock::{StockLedger, UpdateIngredientRequest};
use fratelli_server::errors::ErrorCode;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_roundtrip() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    let created = ledger.create("Açúcar Refinado", 1000.0).await?;
    let fetched = ledger.get(created.id).await?;

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Açúcar Refinado");
    assert!((fetched.quantity - 1000.0).abs() < f64::EPSILON);
    assert!(fetched.status.is_active());
    Ok(())
}

#[tokio::test]
async fn test_create_trims_name_and_defaults_apply() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    let created = ledger.create("  Fermento  ", 0.0).await?;
    assert_eq!(created.name, "Fermento");
    assert!((created.quantity).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_empty_name_and_negative_quantity() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    let err = ledger.create("   ", 10.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = ledger.create("Cacau", -1.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_active_name_conflicts() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    ledger.create("Manteiga", 500.0).await?;
    let err = ledger.create("Manteiga", 250.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateName);
    Ok(())
}

#[tokio::test]
async fn test_list_orders_by_name_ascending() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    ledger.create("Ovos", 12.0).await?;
    ledger.create("Farinha de Trigo", 5000.0).await?;
    ledger.create("Leite Condensado", 790.0).await?;

    let names: Vec<String> = ledger
        .list()
        .await?
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, ["Farinha de Trigo", "Leite Condensado", "Ovos"]);
    Ok(())
}

#[tokio::test]
async fn test_update_is_partial() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());
    let created = ledger.create("Chocolate", 300.0).await?;

    // Name-only update keeps the quantity
    let renamed = ledger
        .update(
            created.id,
            &UpdateIngredientRequest {
                name: Some("Chocolate Meio Amargo".into()),
                quantity: None,
            },
        )
        .await?;
    assert_eq!(renamed.name, "Chocolate Meio Amargo");
    assert!((renamed.quantity - 300.0).abs() < f64::EPSILON);

    // Quantity-only update keeps the name
    let restocked = ledger
        .update(
            created.id,
            &UpdateIngredientRequest {
                name: None,
                quantity: Some(1200.0),
            },
        )
        .await?;
    assert_eq!(restocked.name, "Chocolate Meio Amargo");
    assert!((restocked.quantity - 1200.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_update_rename_collision_conflicts() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    ledger.create("Baunilha", 50.0).await?;
    let other = ledger.create("Canela", 80.0).await?;

    let err = ledger
        .update(
            other.id,
            &UpdateIngredientRequest {
                name: Some("Baunilha".into()),
                quantity: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateName);
    Ok(())
}

#[tokio::test]
async fn test_increment_and_decrement() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());
    let sugar = ledger.create("Açúcar", 100.0).await?;

    ledger.increment(sugar.id, 400.0).await?;
    ledger.decrement(sugar.id, 250.0).await?;

    let current = ledger.get(sugar.id).await?;
    assert!((current.quantity - 250.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_decrement_never_goes_negative() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());
    let sugar = ledger.create("Açúcar", 200.0).await?;

    let err = ledger.decrement(sugar.id, 200.1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // Quantity is untouched by the failed decrement
    let current = ledger.get(sugar.id).await?;
    assert!((current.quantity - 200.0).abs() < f64::EPSILON);

    // Exact depletion to zero is fine
    ledger.decrement(sugar.id, 200.0).await?;
    let current = ledger.get(sugar.id).await?;
    assert!(current.quantity.abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_decrement_missing_ingredient_is_not_found() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());

    let err = ledger.decrement(Uuid::new_v4(), 10.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_mutations_reject_non_positive_amounts() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());
    let sugar = ledger.create("Açúcar", 100.0).await?;

    for amount in [0.0, -5.0, f64::NAN] {
        let err = ledger.decrement(sugar.id, amount).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = ledger.increment(sugar.id, amount).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
    Ok(())
}

#[tokio::test]
async fn test_soft_delete_hides_ingredient_and_frees_name() -> Result<()> {
    let (database, _guard) = common::create_test_database().await?;
    let ledger = StockLedger::new(database.pool().clone());
    let butter = ledger.create("Manteiga", 500.0).await?;

    ledger.soft_delete(butter.id).await?;

    let err = ledger.get(butter.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(ledger.list().await?.is_empty());

    // A soft-deleted ingredient frees its name for reuse
    let replacement = ledger.create("Manteiga", 250.0).await?;
    assert_ne!(replacement.id, butter.id);

    // Deleting again is NotFound, as is mutating the deleted one
    let err = ledger.soft_delete(butter.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    let err = ledger.increment(butter.id, 10.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    Ok(())
}
