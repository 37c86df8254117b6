//! P2P transaction cost endpoints
//!
//! Cost breakdowns are computed in-process from the cached zone-rate
//! table; only the table itself comes from the gateway.

use axum::{extract::rejection::JsonRejection, extract::State, response::Json};
use tracing::instrument;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::models::{P2PCalculateCostRequest, P2PGridComparison, P2PMarketPrices, P2PTransactionCost};
use crate::AppState;

/// Calculate P2P transaction cost
///
/// POST /api/v1/p2p/calculate-cost
#[utoipa::path(
    post,
    path = "/api/v1/p2p/calculate-cost",
    tag = "p2p",
    request_body = P2PCalculateCostRequest,
    responses(
        (status = 200, description = "Cost breakdown", body = P2PTransactionCost),
        (status = 400, description = "Unknown zone or invalid price"),
        (status = 422, description = "Energy amount is not positive"),
        (status = 503, description = "Zone rates unavailable, retry later")
    )
)]
#[instrument(skip(state, payload))]
pub async fn calculate_p2p_cost(
    State(state): State<AppState>,
    payload: std::result::Result<Json<P2PCalculateCostRequest>, JsonRejection>,
) -> Result<Json<P2PTransactionCost>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let cost = state
        .p2p_cost
        .calculate_cost(&payload)
        .await?
        .ok_or_else(|| ApiError::invalid_amount("energy_amount"))?;

    Ok(Json(cost))
}

/// Compare a P2P trade with buying from / selling to the main grid
///
/// POST /api/v1/p2p/compare
#[utoipa::path(
    post,
    path = "/api/v1/p2p/compare",
    tag = "p2p",
    request_body = P2PCalculateCostRequest,
    responses(
        (status = 200, description = "P2P versus grid comparison", body = P2PGridComparison),
        (status = 400, description = "Unknown zone or invalid price"),
        (status = 422, description = "Energy amount is not positive"),
        (status = 503, description = "Zone rates unavailable, retry later")
    )
)]
#[instrument(skip(state, payload))]
pub async fn compare_p2p_with_grid(
    State(state): State<AppState>,
    payload: std::result::Result<Json<P2PCalculateCostRequest>, JsonRejection>,
) -> Result<Json<P2PGridComparison>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let comparison = state
        .p2p_cost
        .compare_with_grid(&payload)
        .await?
        .ok_or_else(|| ApiError::invalid_amount("energy_amount"))?;

    Ok(Json(comparison))
}

/// Get current P2P market prices
///
/// GET /api/v1/p2p/market-prices
#[utoipa::path(
    get,
    path = "/api/v1/p2p/market-prices",
    tag = "p2p",
    responses(
        (status = 200, description = "Reference prices and default zone schedule", body = P2PMarketPrices)
    )
)]
#[instrument(skip(state))]
pub async fn get_p2p_market_prices(State(state): State<AppState>) -> Json<P2PMarketPrices> {
    Json(state.p2p_cost.market_prices())
}
