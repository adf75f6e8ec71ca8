// ABOUTME: Integration tests for the HTTP API surface
// ABOUTME: Exercises the full router with in-process requests and checks the JSON contracts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP route integration tests

mod common;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use fratelli_server::routes::{self, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> Result<(Router, TempDir)> {
    let (database, guard) = common::create_test_database().await?;
    let state = Arc::new(AppState::new(database));
    Ok((routes::router(state), guard))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_database_connectivity() -> Result<()> {
    let (app, _guard) = test_app().await?;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    Ok(())
}

#[tokio::test]
async fn test_ingredient_crud_flow() -> Result<()> {
    let (app, _guard) = test_app().await?;

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/ingredients",
            &json!({ "name": "Açúcar", "quantity": 1000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    assert_eq!(created["name"], "Açúcar");
    assert_eq!(created["quantity"], 1000.0);
    assert_eq!(created["display"]["unit"], "kg");
    let id = created["id"].as_str().unwrap().to_owned();

    // List
    let response = app.clone().oneshot(get("/ingredients")).await.unwrap();
    let listed = response_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/ingredients/{id}"),
            &json!({ "quantity": 250.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["quantity"], 250.0);
    assert_eq!(updated["name"], "Açúcar");

    // Delete, then the list is empty again
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/ingredients/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/ingredients")).await.unwrap();
    let listed = response_json(response).await;
    assert!(listed.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_ingredient_quantities_normalize_units() -> Result<()> {
    let (app, _guard) = test_app().await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/ingredients",
            &json!({ "name": "Farinha", "quantity": 2.0, "unit": "kg" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = response_json(response).await;
    assert_eq!(created["quantity"], 2000.0);
    assert_eq!(created["display"]["value"], 2.0);
    assert_eq!(created["display"]["unit"], "kg");
    Ok(())
}

#[tokio::test]
async fn test_unknown_unit_is_a_bad_request() -> Result<()> {
    let (app, _guard) = test_app().await?;

    let response = app
        .oneshot(json_request(
            "POST",
            "/ingredients",
            &json!({ "name": "Farinha", "quantity": 2.0, "unit": "lbs" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_UNIT");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_ingredient_name_is_a_conflict() -> Result<()> {
    let (app, _guard) = test_app().await?;
    let body = json!({ "name": "Manteiga", "quantity": 500.0 });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/ingredients", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/ingredients", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let envelope = response_json(response).await;
    assert_eq!(envelope["error"]["code"], "DUPLICATE_NAME");
    Ok(())
}

#[tokio::test]
async fn test_recipe_lifecycle_and_preparation() -> Result<()> {
    let (app, _guard) = test_app().await?;

    // Stock: 1kg sugar, 500g flour
    let sugar = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/ingredients",
                &json!({ "name": "Açúcar", "quantity": 1000.0 }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let flour = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/ingredients",
                &json!({ "name": "Farinha", "quantity": 500.0 }),
            ))
            .await
            .unwrap(),
    )
    .await;

    // Recipe: 200g sugar + 100g flour per batch
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/recipes",
            &json!({
                "name": "Bolo Simples",
                "ingredients": [
                    { "ingredient_id": sugar["id"], "amount": 200.0 },
                    { "ingredient_id": flour["id"], "amount": 100.0 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let recipe = response_json(response).await;
    let recipe_id = recipe["id"].as_str().unwrap().to_owned();

    // Capability: min(1000/200, 500/100) = 5
    let response = app
        .clone()
        .oneshot(get("/reports/capability"))
        .await
        .unwrap();
    let capability = response_json(response).await;
    assert_eq!(capability[0]["name"], "Bolo Simples");
    assert_eq!(capability[0]["possible"], 5);

    // Prepare 3 batches
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/recipes/{recipe_id}/prepare"),
            &json!({ "batches": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let preparation = response_json(response).await;
    assert_eq!(preparation["batches"], 3);
    assert_eq!(preparation["records"].as_array().unwrap().len(), 2);

    // Stock report reflects the consumption
    let response = app.clone().oneshot(get("/reports/stock")).await.unwrap();
    let stock = response_json(response).await;
    let by_name = |name: &str| {
        stock
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["name"] == name)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_name("Açúcar")["quantity"], 400.0);
    assert_eq!(by_name("Farinha")["quantity"], 200.0);

    // History carries one entry per consumed ingredient
    let response = app.clone().oneshot(get("/reports/history")).await.unwrap();
    let history = response_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["reason"], "Bolo Simples");

    // Remaining capability dropped to 2
    let response = app.oneshot(get("/reports/capability")).await.unwrap();
    let capability = response_json(response).await;
    assert_eq!(capability[0]["possible"], 2);
    Ok(())
}

#[tokio::test]
async fn test_prepare_beyond_capability_is_a_conflict() -> Result<()> {
    let (app, _guard) = test_app().await?;

    let sugar = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/ingredients",
                &json!({ "name": "Açúcar", "quantity": 100.0 }),
            ))
            .await
            .unwrap(),
    )
    .await;

    let recipe = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/recipes",
                &json!({
                    "name": "Calda",
                    "ingredients": [{ "ingredient_id": sugar["id"], "amount": 80.0 }]
                }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let recipe_id = recipe["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/recipes/{recipe_id}/prepare"),
            &json!({ "batches": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let envelope = response_json(response).await;
    assert_eq!(envelope["error"]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(envelope["error"]["details"]["capability"], 1);
    assert_eq!(envelope["error"]["details"]["requested"], 2);
    Ok(())
}

#[tokio::test]
async fn test_unknown_recipe_returns_not_found_envelope() -> Result<()> {
    let (app, _guard) = test_app().await?;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/recipes/{}/prepare", uuid::Uuid::new_v4()),
            &json!({ "batches": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let envelope = response_json(response).await;
    assert_eq!(envelope["error"]["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_responses_carry_a_request_id() -> Result<()> {
    let (app, _guard) = test_app().await?;

    // Generated when absent
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(generated.to_str().unwrap().starts_with("req_"));

    // Echoed when provided
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-request-id", "req_from_client")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req_from_client"
    );
    Ok(())
}
