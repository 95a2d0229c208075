use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use server::ServerState;
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    server::router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "alice");
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_wallet(app: &Router, name: &str, opening_minor: i64) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/wallets",
        Some(json!({ "name": name, "opening_balance_minor": opening_minor })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn balance_minor(app: &Router, wallet_id: &str) -> i64 {
    let (status, body) = call(app, Method::GET, &format!("/wallets/{wallet_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["balance_minor"].as_i64().unwrap()
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/wallets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_round_trip_through_http() {
    let app = app().await;
    let wallet_id = create_wallet(&app, "Cash", 100_000).await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "wallet_id": wallet_id,
            "amount_minor": 5_000,
            "direction": "expense",
            "occurred_on": "2025-03-10",
            "payment_method": "debit_card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["balance_delta_minor"], json!(-5_000));
    assert_eq!(balance_minor(&app, &wallet_id).await, 95_000);

    let tx_id = created["transactions"][0]["id"].as_str().unwrap().to_string();
    let (status, patched) = call(
        &app,
        Method::PATCH,
        &format!("/transactions/{tx_id}"),
        Some(json!({ "amount_minor": 8_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["transactions"][0]["amount_minor"], json!(8_000));
    assert_eq!(balance_minor(&app, &wallet_id).await, 92_000);

    let (status, deleted) = call(
        &app,
        Method::DELETE,
        &format!("/transactions/{tx_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["balance_delta_minor"], json!(8_000));
    assert_eq!(balance_minor(&app, &wallet_id).await, 100_000);

    let (status, body) = call(&app, Method::GET, &format!("/transactions/{tx_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("not_found"));
}

#[tokio::test]
async fn insufficient_funds_is_unprocessable_with_code() {
    let app = app().await;
    let wallet_id = create_wallet(&app, "Empty", 0).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "wallet_id": wallet_id,
            "amount_minor": 120_000,
            "direction": "expense",
            "occurred_on": "2025-01-15",
            "installments": 12,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], json!("insufficient_funds"));

    let (status, listed) = call(
        &app,
        Method::GET,
        &format!("/wallets/{wallet_id}/transactions"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["transactions"], json!([]));
}

#[tokio::test]
async fn installments_are_listed_by_range() {
    let app = app().await;
    let wallet_id = create_wallet(&app, "Bank", 200_000).await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "wallet_id": wallet_id,
            "amount_minor": 120_000,
            "direction": "expense",
            "occurred_on": "2025-01-15",
            "installments": 12,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["transactions"].as_array().unwrap().len(), 12);
    assert_eq!(created["transactions"][0]["series"]["total"], json!(12));
    assert_eq!(balance_minor(&app, &wallet_id).await, 190_000);

    let (status, listed) = call(
        &app,
        Method::GET,
        &format!("/wallets/{wallet_id}/transactions?from=2025-03-01&to=2025-05-01"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = listed["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["occurred_on"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2025-04-15", "2025-03-15"]);
}

#[tokio::test]
async fn duplicate_wallet_is_a_conflict() {
    let app = app().await;
    create_wallet(&app, "Cash", 0).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/wallets",
        Some(json!({ "name": "CASH" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("already_exists"));
}

#[tokio::test]
async fn subscription_billing_over_http() {
    let app = app().await;
    let wallet_id = create_wallet(&app, "Cash", 50_000).await;

    let (status, subscription) = call(
        &app,
        Method::POST,
        "/subscriptions",
        Some(json!({
            "name": "Streaming",
            "amount_minor": 2_990,
            "frequency": "monthly",
            "wallet_id": wallet_id,
            "next_billing_date": "2025-03-14",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subscription["status"], json!("active"));
    let subscription_id = subscription["id"].as_str().unwrap().to_string();

    let (status, summary) = call(
        &app,
        Method::POST,
        "/billing/run",
        Some(json!({ "date": "2025-03-15" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["processed"], json!(1));
    assert_eq!(summary["details"][0]["next_billing_date"], json!("2025-04-14"));
    assert_eq!(balance_minor(&app, &wallet_id).await, 47_010);

    let (status, paused) = call(
        &app,
        Method::POST,
        &format!("/subscriptions/{subscription_id}/pause"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paused["status"], json!("paused"));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/subscriptions/{subscription_id}/pause"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], json!("invalid_argument"));

    let (status, deleted) = call(
        &app,
        Method::DELETE,
        &format!("/subscriptions/{subscription_id}?cascade=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted_transactions"].as_array().unwrap().len(), 1);
    assert_eq!(balance_minor(&app, &wallet_id).await, 50_000);
}

#[tokio::test]
async fn budget_status_over_http() {
    let app = app().await;
    let wallet_id = create_wallet(&app, "Cash", 50_000).await;
    let (status, category) = call(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Food" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::PUT,
        "/budgets",
        Some(json!({
            "category_id": category_id,
            "year": 2025,
            "month": 3,
            "limit_minor": 10_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "wallet_id": wallet_id,
            "amount_minor": 12_000,
            "direction": "expense",
            "occurred_on": "2025-03-03",
            "category_id": category_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        Method::GET,
        "/budgets/status?year=2025&month=3",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let budget = &body["budgets"][0];
    assert_eq!(budget["spent_minor"], json!(12_000));
    assert_eq!(budget["remaining_minor"], json!(-2_000));
    assert_eq!(budget["exceeded"], json!(true));
}
