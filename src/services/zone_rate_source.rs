//! Zone rate sources
//!
//! The active zone-rate table is owned by the API gateway. The pricing
//! service only reads it, through the [`ZoneRateSource`] trait so the
//! cache can be fed from a fixture in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::error::PricingError;
use crate::models::{ZoneId, ZoneRate};

#[async_trait]
pub trait ZoneRateSource: Send + Sync {
    /// Fetch every active zone rate
    async fn fetch_rates(&self) -> Result<Vec<ZoneRate>, PricingError>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Gateway row shape (`GET /api/v1/admin/zone-rates`)
#[derive(Debug, Deserialize)]
struct ZoneRateRecord {
    from_zone_id: ZoneId,
    to_zone_id: ZoneId,
    wheeling_charge: Decimal,
    loss_factor: Decimal,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Reads zone rates from the API gateway over HTTP
#[derive(Debug, Clone)]
pub struct GatewayZoneRateSource {
    client: Client,
    url: String,
}

impl GatewayZoneRateSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PricingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PricingError::SourceUnavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// Timeouts are reported apart from other transport failures
fn request_error(context: &str, e: reqwest::Error) -> PricingError {
    if e.is_timeout() {
        PricingError::SourceTimeout(format!("{}: {}", context, e))
    } else {
        PricingError::SourceUnavailable(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl ZoneRateSource for GatewayZoneRateSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> Result<Vec<ZoneRate>, PricingError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Failed to connect to gateway: {}", e);
            request_error("Failed to connect to gateway", e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gateway returned error: {} - {}", status, error_text);
            return Err(PricingError::SourceUnavailable(format!(
                "Gateway error: {} - {}",
                status, error_text
            )));
        }

        let records = response.json::<Vec<ZoneRateRecord>>().await.map_err(|e| {
            error!("Failed to parse gateway response: {}", e);
            request_error("Failed to parse gateway response", e)
        })?;

        debug!("Gateway returned {} zone rate rows", records.len());

        Ok(records
            .into_iter()
            .filter(|r| r.is_active)
            .map(|r| ZoneRate {
                from_zone_id: r.from_zone_id,
                to_zone_id: r.to_zone_id,
                wheeling_charge: r.wheeling_charge,
                loss_factor: r.loss_factor,
            })
            .collect())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
