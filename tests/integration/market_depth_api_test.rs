use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use p2p_pricing::{
    build_router, services::GridTopologyService, AppState, Config, PricingConfig,
};

fn app() -> Router {
    let config = Config {
        metrics_enabled: false,
        ..Config::default()
    };
    let topology = Arc::new(GridTopologyService::new(PricingConfig::default()));
    build_router(AppState::new(config, topology, None))
}

fn sample_orders() -> Value {
    json!([
        {"side": "buy", "price": 3.0, "amount": 10},
        {"side": "buy", "price": 3.2, "amount": 5},
        {"side": "buy", "price": 3.0, "amount": 15},
        {"side": "sell", "price": 3.5, "amount": 8},
        {"side": "sell", "price": 3.4, "amount": 4},
        {"side": "sell", "price": 3.6, "amount": 20},
        {"side": "sell", "price": 3.4, "amount": 6}
    ])
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_depth_aggregates_levels() {
    let (status, body) = post_json("/api/v1/market/depth", json!({"orders": sample_orders()})).await;

    assert_eq!(status, StatusCode::OK);
    let bids = body["bids"].as_array().unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0]["price"], json!(3.2));
    assert_eq!(bids[1]["volume"], json!(25.0));
    assert_eq!(bids[1]["order_count"], 2);
    assert_eq!(bids[1]["cumulative_volume"], json!(30.0));

    let asks = body["asks"].as_array().unwrap();
    assert_eq!(asks.len(), 3);
    assert_eq!(asks[0]["price"], json!(3.4));
    assert_eq!(asks[0]["volume"], json!(10.0));

    assert_eq!(body["best_bid"], json!(3.2));
    assert_eq!(body["best_ask"], json!(3.4));
    assert_eq!(body["mid_price"], json!(3.3));
    assert_eq!(body["spread_percentage"], json!(6.25));
    assert_eq!(body["total_sell_volume"], json!(38.0));
}

#[tokio::test]
async fn test_depth_of_empty_book() {
    let (status, body) = post_json("/api/v1/market/depth", json!({"orders": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["bids"].as_array().unwrap().is_empty());
    assert!(body["best_bid"].is_null());
    assert!(body["spread"].is_null());
}

#[tokio::test]
async fn test_depth_chart() {
    let (status, body) =
        post_json("/api/v1/market/depth-chart", json!({"orders": sample_orders()})).await;

    assert_eq!(status, StatusCode::OK);
    let asks = body["cumulative_asks"].as_array().unwrap();
    let cumulative: Vec<f64> = asks
        .iter()
        .map(|p| p["cumulative_volume"].as_f64().unwrap())
        .collect();
    assert_eq!(cumulative, vec![10.0, 18.0, 38.0]);
}

#[tokio::test]
async fn test_price_impact_buy() {
    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({"orders": sample_orders(), "side": "buy", "amount": 14}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fully_filled"], true);
    assert_eq!(body["levels_consumed"], 2);
    assert_eq!(body["total_value"], json!(48.0));
    assert_eq!(body["best_price"], json!(3.4));
    assert_eq!(body["worst_price"], json!(3.5));
    assert!(body["price_impact_percent"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_price_impact_partial_fill() {
    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({"orders": sample_orders(), "side": "sell", "amount": 40}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fully_filled"], false);
    assert_eq!(body["filled_amount"], json!(30.0));
    assert_eq!(body["unfilled_amount"], json!(10.0));
}

#[tokio::test]
async fn test_price_impact_rejects_zero_amount() {
    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({"orders": sample_orders(), "side": "buy", "amount": 0}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "amount");
}

#[tokio::test]
async fn test_oversized_volumes_are_unprocessable() {
    let orders = json!([
        {"side": "sell", "price": 3.5, "amount": 5e28},
        {"side": "sell", "price": 3.5, "amount": 5e28}
    ]);

    for uri in ["/api/v1/market/depth", "/api/v1/market/depth-chart"] {
        let (status, body) = post_json(uri, json!({"orders": orders})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["error"]["code"], "VAL_3005");
    }

    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({"orders": orders, "side": "buy", "amount": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VAL_3005");
}

#[tokio::test]
async fn test_oversized_fill_value_is_unprocessable() {
    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({
            "orders": [{"side": "sell", "price": 3.5, "amount": 5e28}],
            "side": "buy",
            "amount": 5e28
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VAL_3005");
}

#[tokio::test]
async fn test_unknown_side_rejected() {
    let (status, body) = post_json(
        "/api/v1/market/price-impact",
        json!({"orders": [], "side": "hold", "amount": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_3001");
}
