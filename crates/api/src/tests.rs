use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use finadvisor_core::market::provider::QuoteProvider;
use finadvisor_core::market::types::{CryptoQuote, StockQuote};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Stub<Q>(Option<Vec<Q>>);

#[async_trait::async_trait]
impl<Q: Clone + Send + Sync> QuoteProvider<Q> for Stub<Q> {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_quotes(&self) -> anyhow::Result<Vec<Q>> {
        self.0.clone().ok_or_else(|| anyhow::anyhow!("timed out"))
    }
}

fn offline_market() -> MarketDataSource {
    MarketDataSource::new(Arc::new(Stub::<CryptoQuote>(None)), Arc::new(Stub::<StockQuote>(None)))
}

fn live_market() -> MarketDataSource {
    let crypto = vec![CryptoQuote {
        symbol: "BTC".into(),
        name: "bitcoin".into(),
        price: 61_000.0,
        change_24h: 3.5,
        market_cap: Some(1.2e12),
        volume_24h: Some(3.0e10),
    }];
    let stocks = vec![StockQuote {
        symbol: "SPY".into(),
        price: 512.5,
        change_percent: 1.5,
        volume: Some(5.0e7),
    }];
    MarketDataSource::new(Arc::new(Stub(Some(crypto))), Arc::new(Stub(Some(stocks))))
}

async fn test_app(market: MarketDataSource) -> Router {
    let pool = finadvisor_core::storage::connect("sqlite::memory:").await.unwrap();
    finadvisor_core::storage::migrate(&pool).await.unwrap();
    app(AppState {
        pool: Some(pool),
        market,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_user(app: &Router, email: &str, tolerance: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({"name": "Sam", "email": email, "age": 29, "risk_tolerance": tolerance})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = test_app(offline_market()).await;
    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn user_crud_and_error_statuses() {
    let app = test_app(offline_market()).await;
    let id = create_user(&app, "sam@example.com", "aggressive").await;

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk_tolerance"], "aggressive");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{id}"),
        Some(json!({"annual_income": 120000.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["annual_income"], 120000.0);
    assert_eq!(body["age"], 29);

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"name": "Dup", "email": "sam@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"name": " ", "email": "blank@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/users/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("user 9999"));

    let (status, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transactions_feed_savings_and_advice() {
    let app = test_app(offline_market()).await;
    let id = create_user(&app, "saver@example.com", "conservative").await;

    for (amount, kind) in [(3000.0, "income"), (600.0, "expense")] {
        let (status, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(json!({"user_id": id, "amount": amount, "type": kind})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", &format!("/users/{id}/transactions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", &format!("/users/{id}/savings"), None).await;
    assert_eq!(body["monthly_savings"], 800.0);
    assert_eq!(body["window_months"], 3);

    let (status, body) = send(&app, "GET", &format!("/users/{id}/advice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk_tolerance"], "conservative");
    assert_eq!(body["allocations"][0]["asset"], "SPY");
    assert_eq!(body["allocations"][0]["amount"], 560.0);
    assert_eq!(body["allocations"][1]["percent"], 30.0);

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({"user_id": id, "amount": -5.0, "type": "expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({"user_id": 4242, "amount": 5.0, "type": "expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn budgets_require_own_category_and_report_status() {
    let app = test_app(offline_market()).await;
    let owner = create_user(&app, "owner@example.com", "moderate").await;
    let other = create_user(&app, "other@example.com", "moderate").await;

    let (status, cat) = send(
        &app,
        "POST",
        "/categories",
        Some(json!({"user_id": owner, "name": "Dining", "kind": "expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = cat["id"].as_i64().unwrap();

    let today = Utc::now().date_naive();
    let budget = json!({
        "user_id": other,
        "category_id": category_id,
        "amount": 200.0,
        "start_date": today,
        "end_date": today,
    });
    let (status, _) = send(&app, "POST", "/budgets", Some(budget)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = send(
        &app,
        "POST",
        "/budgets",
        Some(json!({
            "user_id": owner,
            "category_id": category_id,
            "amount": 200.0,
            "start_date": today,
            "end_date": today,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let budget_id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({"user_id": owner, "amount": 50.0, "type": "expense", "category_id": category_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/budgets/{budget_id}/status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spent"], 50.0);
    assert_eq!(body["remaining"], 150.0);
    assert_eq!(body["over_budget"], false);

    let (_, listed) = send(&app, "GET", &format!("/users/{owner}/categories"), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/categories/{category_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/budgets/{budget_id}/status"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recommendations_and_snapshot_use_live_quotes() {
    let app = test_app(live_market()).await;
    let id = create_user(&app, "rec@example.com", "aggressive").await;

    let (status, body) = send(&app, "GET", &format!("/users/{id}/recommendations"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["market"]["crypto_source"], "live");
    assert_eq!(body["recommendations"][0]["symbol"], "SPY");
    assert_eq!(body["recommendations"][0]["current_price"], 512.5);
    assert_eq!(body["recommendations"][1]["percent"], 70.0);
    assert_eq!(body["recommendations"][1]["timeframe"], "short_term");

    let (_, snap) = send(&app, "GET", "/market/snapshot", None).await;
    assert_eq!(snap["scores"]["trend"], "bullish");
    assert_eq!(snap["scores"]["volatility"], "medium");

    let (status, profile) = send(&app, "GET", &format!("/users/{id}/risk-profile"), None).await;
    assert_eq!(status, StatusCode::OK);
    // 0.3 (age 29) + 0.1 (no income) + 0.4 (aggressive)
    assert_eq!(profile["category"], "aggressive");
}

#[tokio::test]
async fn malformed_requests_get_the_json_error_envelope() {
    let app = test_app(offline_market()).await;
    let id = create_user(&app, "strict@example.com", "moderate").await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({"user_id": id, "amount": 5.0, "type": "transfer"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("transfer"), "{body}");

    let (status, body) = send(&app, "POST", "/users", Some(json!({"name": "No Email"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = send(&app, "GET", "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/budgets/abc/status", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn transaction_category_can_be_cleared() {
    let app = test_app(offline_market()).await;
    let id = create_user(&app, "unlink@example.com", "moderate").await;

    let (_, cat) = send(
        &app,
        "POST",
        "/categories",
        Some(json!({"user_id": id, "name": "Fun", "kind": "expense"})),
    )
    .await;
    let (status, tx) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({"user_id": id, "amount": 20.0, "type": "expense", "category_id": cat["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["category_id"], cat["id"]);
    let tx_id = tx["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{tx_id}"),
        Some(json!({"description": "cinema"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category_id"], cat["id"]);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{tx_id}"),
        Some(json!({"category_id": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category_id"], Value::Null);
    assert_eq!(body["description"], "cinema");
}

#[tokio::test]
async fn degraded_mode_without_database() {
    let app = app(AppState {
        pool: None,
        market: offline_market(),
    });

    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);

    let (status, snap) = send(&app, "GET", "/market/snapshot", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["crypto_source"], "fallback");
    assert_eq!(snap["stock_source"], "fallback");
    assert_eq!(snap["crypto"][0]["price"], 45000.0);
    assert_eq!(snap["stocks"][0]["price"], 4500.0);
}
