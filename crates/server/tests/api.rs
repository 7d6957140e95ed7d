use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Store};
use migration::MigratorTrait;
use server::{Mode, ServerState, StaticTokens, router};

async fn app(mode: Mode) -> Router {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(store.connection(), None)
        .await
        .unwrap();
    let engine = Engine::builder().store(store).build().await.unwrap();
    let tokens = StaticTokens::new(HashMap::from([
        ("alice-token".to_string(), "alice".to_string()),
        ("bob-token".to_string(), "bob".to_string()),
    ]));
    router(ServerState::new(engine, tokens, mode))
}

async fn call(app: &Router, token: Option<&str>, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-token", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn alice(app: &Router, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call(app, Some("alice-token"), uri, body).await
}

/// Checking and Savings with 100.00 each plus the default categories.
async fn seeded(mode: Mode) -> Router {
    let app = app(mode).await;
    let (status, _) = alice(&app, "/category/init", None).await;
    assert_eq!(status, StatusCode::CREATED);
    for name in ["Checking", "Savings"] {
        let (status, _) = alice(
            &app,
            "/wallet/create",
            Some(json!({"name": name, "type": "bank_account", "balance": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app(Mode::Production).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_empty_token_is_rejected() {
    let app = app(Mode::Test).await;

    let (status, body) = call(&app, None, "/wallet/list", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "token cannot be empty");

    let (status, body) = call(&app, Some(""), "/wallet/list", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "token cannot be empty");
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = app(Mode::Test).await;

    let (status, body) = call(&app, Some("mallory"), "/wallet/list", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "token is invalid");
}

#[tokio::test]
async fn expense_scenario_updates_the_wallet() {
    let app = seeded(Mode::Test).await;

    let (status, body) = alice(
        &app,
        "/transaction/createExpense",
        Some(json!({"amount": "30.00", "src_wallet": "Checking", "category": "Food"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["transaction"]["type"], "expense");
    assert_eq!(body["transaction"]["amount"], "30.00");
    assert_eq!(body["transaction"]["src_wallet"], "Checking");
    assert_eq!(body["wallets"][0]["balance"], "70.00");

    let (_, wallet) = alice(&app, "/wallet/get", Some(json!({"name": "Checking"}))).await;
    assert_eq!(wallet["balance"], "70.00");
}

#[tokio::test]
async fn transfer_scenario_moves_money() {
    let app = seeded(Mode::Test).await;

    let (status, body) = alice(
        &app,
        "/transaction/createTransfer",
        Some(json!({
            "amount": 50,
            "src_wallet": "Checking",
            "dst_wallet": "Savings",
            "category": "Other",
            "date": "0001-01-01T00:00:00Z"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["wallets"][0]["balance"], "50.00");
    assert_eq!(body["wallets"][1]["balance"], "150.00");
    assert_ne!(body["transaction"]["date"], "0001-01-01T00:00:00Z");

    let id = body["transaction"]["id"].clone();
    let (status, found) = alice(&app, "/transaction/get", Some(json!({"id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["dst_wallet"], "Savings");
}

#[tokio::test]
async fn income_into_unknown_wallet_is_a_conflict() {
    let app = seeded(Mode::Test).await;

    let (status, _) = alice(
        &app,
        "/transaction/createIncome",
        Some(json!({"amount": 10, "dst_wallet": "Nowhere", "category": "Salary"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn engine_errors_map_to_statuses() {
    let app = seeded(Mode::Test).await;

    let (status, body) = alice(
        &app,
        "/transaction/createTransfer",
        Some(json!({
            "amount": 5,
            "src_wallet": "Checking",
            "dst_wallet": "Checking",
            "category": "Other"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("must differ"));

    let (status, _) = alice(&app, "/transaction/get", Some(json!({"id": 999}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = alice(
        &app,
        "/wallet/create",
        Some(json!({"name": "Checking", "type": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn owners_do_not_see_each_other() {
    let app = seeded(Mode::Test).await;

    let (status, body) = call(&app, Some("bob-token"), "/wallet/list", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 0);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn list_endpoints_report_length_and_items() {
    let app = seeded(Mode::Test).await;
    for amount in ["1.00", "2.00"] {
        alice(
            &app,
            "/transaction/createExpense",
            Some(json!({"amount": amount, "src_wallet": "Savings", "category": "Bills"})),
        )
        .await;
    }

    let (_, wallets) = alice(&app, "/wallet/list", None).await;
    assert_eq!(wallets["length"], 2);

    let (_, transactions) = alice(
        &app,
        "/transaction/list",
        Some(json!({"wallet": "Savings", "type": "expense"})),
    )
    .await;
    assert_eq!(transactions["length"], 2);

    let (status, unfiltered) = alice(&app, "/transaction/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unfiltered["length"], 2);

    let (_, types) = alice(&app, "/wallet/listTypes", None).await;
    assert_eq!(types["items"], json!(["cash", "bank_account", "credit"]));

    let (_, kinds) = alice(&app, "/transaction/listTypes", None).await;
    assert_eq!(kinds["items"], json!(["income", "expense", "transfer"]));
}

#[tokio::test]
async fn delete_transaction_restores_the_balance() {
    let app = seeded(Mode::Test).await;
    let (_, posted) = alice(
        &app,
        "/transaction/createExpense",
        Some(json!({"amount": "12.50", "src_wallet": "Checking", "category": "Food"})),
    )
    .await;

    let (status, _) = alice(
        &app,
        "/transaction/delete",
        Some(json!({"id": posted["transaction"]["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, wallet) = alice(&app, "/wallet/get", Some(json!({"name": "Checking"}))).await;
    assert_eq!(wallet["balance"], "100.00");
}

#[tokio::test]
async fn clear_routes_exist_only_outside_production() {
    let test_app = seeded(Mode::Test).await;
    let (status, body) = alice(&test_app, "/transaction/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 0);

    let production = app(Mode::Production).await;
    let (status, _) = alice(&production, "/transaction/clear", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
