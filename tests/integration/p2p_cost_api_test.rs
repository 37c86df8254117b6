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

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
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

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_calculate_cost_same_zone() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 3, "seller_zone_id": 3, "energy_amount": 100, "agreed_price": 4}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["energy_cost"], json!(400.0));
    assert_eq!(body["wheeling_charge"], json!(0.0));
    assert_eq!(body["loss_cost"], json!(4.0));
    assert_eq!(body["total_cost"], json!(404.0));
    assert_eq!(body["effective_energy"], json!(99.0));
    assert_eq!(body["loss_allocation"], "buyer");
    assert_eq!(body["is_grid_compliant"], true);
}

#[tokio::test]
async fn test_calculate_cost_cross_zone_uses_market_price() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 1, "seller_zone_id": 3, "energy_amount": 10}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // 10 kWh at the 3.50 base price
    assert_eq!(body["energy_cost"], json!(35.0));
    // 2 steps: 1.70/kWh
    assert_eq!(body["wheeling_charge"], json!(17.0));
    assert_eq!(body["zone_distance_km"], json!(10.0));
    assert_eq!(body["seller_zone"], 3);
    assert_eq!(body["buyer_zone"], 1);
}

#[tokio::test]
async fn test_zero_amount_is_unprocessable() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 1, "seller_zone_id": 2, "energy_amount": 0}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VAL_3005");
    assert_eq!(body["error"]["message"], "Enter a valid amount");
    assert_eq!(body["error"]["field"], "energy_amount");
    assert_eq!(body["error"]["retryable"], false);
}

#[tokio::test]
async fn test_sub_resolution_amount_is_unprocessable() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 1, "seller_zone_id": 2, "energy_amount": 1e-12}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VAL_3005");
    assert_eq!(body["error"]["field"], "energy_amount");
}

#[tokio::test]
async fn test_oversized_amount_is_unprocessable() {
    for uri in ["/api/v1/p2p/calculate-cost", "/api/v1/p2p/compare"] {
        let (status, body) = post_json(
            app(),
            uri,
            json!({"buyer_zone_id": 1, "seller_zone_id": 2, "energy_amount": 7e28}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["error"]["code"], "VAL_3005");
        assert_eq!(body["error"]["retryable"], false);
    }
}

#[tokio::test]
async fn test_unknown_zone_rejected() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 1, "seller_zone_id": 42, "energy_amount": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "GRID_5101");
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/calculate-cost",
        json!({"buyer_zone_id": 1, "seller_zone_id": 2, "energy_amount": 5, "agreed_price": -1}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_3009");
    assert_eq!(body["error"]["field"], "agreed_price");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/p2p/calculate-cost")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VAL_3003");
}

#[tokio::test]
async fn test_compare_with_grid() {
    let (status, body) = post_json(
        app(),
        "/api/v1/p2p/compare",
        json!({"buyer_zone_id": 2, "seller_zone_id": 2, "energy_amount": 100, "agreed_price": 3}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grid_import_cost"], json!(450.0));
    assert_eq!(body["grid_export_value"], json!(220.0));
    assert_eq!(body["buyer_savings"], json!(147.0));
    assert_eq!(body["seller_premium"], json!(80.0));
    assert_eq!(body["is_p2p_beneficial_for_buyer"], true);
    assert_eq!(body["p2p_transaction"]["total_cost"], json!(303.0));
}

#[tokio::test]
async fn test_market_prices() {
    let (status, body) = get_json(app(), "/api/v1/p2p/market-prices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_price_kwh"], json!(3.5));
    assert_eq!(body["grid_import_price_kwh"], json!(4.5));
    assert_eq!(body["loss_allocation_model"], "buyer");
    assert_eq!(body["wheeling_charges"]["intra_zone"], json!(0.0));
    assert_eq!(body["wheeling_charges"]["adjacent_zone"], json!(1.0));
}

#[tokio::test]
async fn test_zone_rate_by_pair() {
    let (status, body) = get_json(app(), "/api/v1/zones/rates/1/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wheeling_charge"], json!(1.0));
    assert_eq!(body["loss_factor"], json!(0.03));

    let (status, _) = get_json(app(), "/api/v1/zones/rates/1/99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_default_schedule() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["zone_rates"]["source"], "defaults");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/p2p/market-prices")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_metrics_disabled() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
