use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub environment: String,
    pub zone_rates: ZoneRatesHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ZoneRatesHealth {
    /// "gateway" when an upstream table is configured, "defaults" otherwise
    pub source: String,
    pub cached_rates: usize,
    pub cache_age_secs: Option<u64>,
}

impl HealthStatus {
    pub fn new(environment: &str, zone_rates: ZoneRatesHealth) -> Self {
        // A configured source that never loaded means we are pricing from defaults
        let status = if zone_rates.source == "gateway" && zone_rates.cache_age_secs.is_none() {
            "degraded"
        } else {
            "healthy"
        };

        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.to_string(),
            zone_rates,
        }
    }
}

/// Basic health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let topology = &state.grid_topology;
    let zone_rates = ZoneRatesHealth {
        source: if topology.has_source() { "gateway" } else { "defaults" }.to_string(),
        cached_rates: topology.cached_rates().await.len(),
        cache_age_secs: topology.cache_age_secs().await,
    };

    Json(HealthStatus::new(&state.config.environment, zone_rates))
}
