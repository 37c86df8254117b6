// Order book analytics over a caller-supplied snapshot of resting orders

use axum::{extract::rejection::JsonRejection, extract::State, response::Json};
use tracing::{debug, instrument};
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::models::{MarketDepthChart, OrderBookDepth, OrderBookRequest, PriceImpact, PriceImpactRequest};
use crate::services::OrderBook;
use crate::AppState;

/// Get order book depth
#[utoipa::path(
    post,
    path = "/api/v1/market/depth",
    tag = "Market Data",
    request_body = OrderBookRequest,
    responses(
        (status = 200, description = "Aggregated depth with best quotes", body = OrderBookDepth),
        (status = 400, description = "Invalid order snapshot"),
        (status = 422, description = "Order volumes too large to aggregate")
    )
)]
#[instrument(skip(_state, payload))]
pub async fn get_order_book_depth(
    State(_state): State<AppState>,
    payload: std::result::Result<Json<OrderBookRequest>, JsonRejection>,
) -> Result<Json<OrderBookDepth>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let depth = OrderBook::from_orders(&payload.orders)?.snapshot()?;
    debug!(
        bids = depth.bids.len(),
        asks = depth.asks.len(),
        "Aggregated order book depth"
    );
    Ok(Json(depth))
}

/// Get market depth chart data
#[utoipa::path(
    post,
    path = "/api/v1/market/depth-chart",
    tag = "Market Data",
    request_body = OrderBookRequest,
    responses(
        (status = 200, description = "Cumulative depth curves", body = MarketDepthChart),
        (status = 400, description = "Invalid order snapshot"),
        (status = 422, description = "Order volumes too large to aggregate")
    )
)]
#[instrument(skip(_state, payload))]
pub async fn get_market_depth_chart(
    State(_state): State<AppState>,
    payload: std::result::Result<Json<OrderBookRequest>, JsonRejection>,
) -> Result<Json<MarketDepthChart>> {
    let Json(payload) = payload?;
    payload.validate()?;

    Ok(Json(OrderBook::from_orders(&payload.orders)?.depth_chart()))
}

/// Estimate the price impact of a market order
#[utoipa::path(
    post,
    path = "/api/v1/market/price-impact",
    tag = "Market Data",
    request_body = PriceImpactRequest,
    responses(
        (status = 200, description = "Hypothetical fill against the book", body = PriceImpact),
        (status = 400, description = "Invalid order snapshot"),
        (status = 422, description = "Amount is not positive or the fill is too large")
    )
)]
#[instrument(skip(_state, payload))]
pub async fn get_price_impact(
    State(_state): State<AppState>,
    payload: std::result::Result<Json<PriceImpactRequest>, JsonRejection>,
) -> Result<Json<PriceImpact>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let impact = OrderBook::from_orders(&payload.orders)?
        .price_impact(payload.side, payload.amount)?
        .ok_or_else(|| ApiError::invalid_amount("amount"))?;

    metrics::histogram!("price_impact_levels_consumed").record(impact.levels_consumed as f64);
    Ok(Json(impact))
}
