// Zone rate endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::{ZoneId, ZoneRate};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ZoneRatesResponse {
    /// Rates loaded from the gateway; pairs not listed use the default schedule
    pub rates: Vec<ZoneRate>,
    pub has_source: bool,
    /// Seconds since the last successful refresh
    pub cache_age_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ZoneRatesRefreshResponse {
    pub loaded: usize,
    pub has_source: bool,
}

/// List cached zone rates
#[utoipa::path(
    get,
    path = "/api/v1/zones/rates",
    tag = "zones",
    responses(
        (status = 200, description = "Cached zone rates", body = ZoneRatesResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_zone_rates(State(state): State<AppState>) -> Json<ZoneRatesResponse> {
    let topology = &state.grid_topology;
    Json(ZoneRatesResponse {
        rates: topology.cached_rates().await,
        has_source: topology.has_source(),
        cache_age_secs: topology.cache_age_secs().await,
    })
}

/// Effective rate for energy flowing from one zone to another
#[utoipa::path(
    get,
    path = "/api/v1/zones/rates/{from}/{to}",
    tag = "zones",
    params(
        ("from" = i32, Path, description = "Sending (seller) zone"),
        ("to" = i32, Path, description = "Receiving (buyer) zone")
    ),
    responses(
        (status = 200, description = "Effective zone rate", body = ZoneRate),
        (status = 400, description = "Zone not configured")
    )
)]
#[instrument(skip(state))]
pub async fn get_zone_rate(
    State(state): State<AppState>,
    Path((from, to)): Path<(ZoneId, ZoneId)>,
) -> Result<Json<ZoneRate>> {
    let rate = state.grid_topology.rate_for(from, to).await?;
    Ok(Json(rate))
}

/// Reload zone rates from the gateway
#[utoipa::path(
    post,
    path = "/api/v1/zones/rates/refresh",
    tag = "zones",
    responses(
        (status = 200, description = "Rates reloaded", body = ZoneRatesRefreshResponse),
        (status = 502, description = "Gateway served an unusable rate table"),
        (status = 503, description = "Gateway unavailable, previous rates kept"),
        (status = 504, description = "Gateway timed out, previous rates kept")
    )
)]
#[instrument(skip(state))]
pub async fn refresh_zone_rates(State(state): State<AppState>) -> Result<Json<ZoneRatesRefreshResponse>> {
    let topology = &state.grid_topology;
    let loaded = topology.load_rates().await.inspect_err(|e| {
        warn!("Manual zone rate refresh failed: {}", e);
    })?;

    info!(loaded, "Zone rates refreshed on request");
    Ok(Json(ZoneRatesRefreshResponse {
        loaded,
        has_source: topology.has_source(),
    }))
}
