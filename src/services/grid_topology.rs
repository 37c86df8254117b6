use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::PricingConfig;
use crate::error::PricingError;
use crate::models::{P2PMarketPrices, ZoneId, ZoneRate};

use super::zone_rate_source::ZoneRateSource;

/// Loss factors never exceed 15% on the default schedule
fn max_default_loss_factor() -> Decimal {
    Decimal::new(15, 2)
}

/// Service to manage grid topology and calculate transmission costs
#[derive(Clone)]
pub struct GridTopologyService {
    /// Cached zone rates: (from_zone, to_zone) -> ZoneRate
    rates_cache: Arc<RwLock<HashMap<(ZoneId, ZoneId), ZoneRate>>>,
    /// Upstream table of zone rates
    source: Option<Arc<dyn ZoneRateSource>>,
    /// Last cache refresh timestamp
    last_refresh: Arc<RwLock<Option<Instant>>>,
    config: Arc<PricingConfig>,
}

impl GridTopologyService {
    /// Service using only the default distance-based schedule
    pub fn new(config: PricingConfig) -> Self {
        Self {
            rates_cache: Arc::new(RwLock::new(HashMap::new())),
            source: None,
            last_refresh: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
        }
    }

    /// Create service with an upstream source for dynamic rates
    pub fn with_source(config: PricingConfig, source: Arc<dyn ZoneRateSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Spawn a background task to refresh cache periodically
    /// Returns the JoinHandle for the spawned task
    pub fn spawn_refresh_task(
        self: Arc<Self>,
        refresh_interval_secs: u64,
    ) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_secs(refresh_interval_secs);
        info!(
            "🔄 Starting zone rates cache refresh task (interval: {}s)",
            refresh_interval_secs
        );

        tokio::spawn(async move {
            // Initial load
            if let Err(e) = self.load_rates().await {
                error!("Failed initial zone rates load: {}", e);
            }

            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.tick().await; // Skip first immediate tick

            loop {
                interval_timer.tick().await;
                match self.load_rates().await {
                    Ok(count) => {
                        info!("🔄 Refreshed zone rates cache: {} rates loaded", count);
                    }
                    Err(e) => {
                        error!("Failed to refresh zone rates cache: {}", e);
                    }
                }
            }
        })
    }

    /// Load zone rates from the upstream source into cache.
    ///
    /// Rows that break the topology invariants are skipped. On a fetch
    /// failure the previous cache stays in place.
    pub async fn load_rates(&self) -> Result<usize, PricingError> {
        let Some(source) = &self.source else {
            warn!("No zone rate source configured, using default rates");
            return Ok(0);
        };

        let rows = match source.fetch_rates().await {
            Ok(rows) => rows,
            Err(e) => {
                metrics::counter!("zone_rate_refresh_total", "result" => "error").increment(1);
                return Err(e);
            }
        };

        let mut fresh = HashMap::with_capacity(rows.len());
        for rate in rows {
            if let Err(e) = rate.validate() {
                warn!("Skipping zone rate from {}: {}", source.describe(), e);
                continue;
            }
            fresh.insert((rate.from_zone_id, rate.to_zone_id), rate);
        }

        let count = fresh.len();
        *self.rates_cache.write().await = fresh;

        // Update last refresh timestamp
        *self.last_refresh.write().await = Some(Instant::now());
        metrics::counter!("zone_rate_refresh_total", "result" => "ok").increment(1);
        metrics::gauge!("zone_rates_cached").set(count as f64);
        debug!("Loaded {} zone rates from {}", count, source.describe());
        Ok(count)
    }

    /// Get cache age in seconds (None if never refreshed)
    pub async fn cache_age_secs(&self) -> Option<u64> {
        self.last_refresh.read().await.map(|t| t.elapsed().as_secs())
    }

    /// Cached rates ordered by zone pair
    pub async fn cached_rates(&self) -> Vec<ZoneRate> {
        let cache = self.rates_cache.read().await;
        let mut rates: Vec<ZoneRate> = cache.values().cloned().collect();
        rates.sort_by_key(|r| (r.from_zone_id, r.to_zone_id));
        rates
    }

    /// Reject zones that are neither configured nor present in the rate table
    pub async fn ensure_zone(&self, zone: ZoneId) -> Result<(), PricingError> {
        if self.config.zones.contains(&zone) {
            return Ok(());
        }
        let cache = self.rates_cache.read().await;
        if cache
            .keys()
            .any(|&(from, to)| from == zone || to == zone)
        {
            return Ok(());
        }
        Err(PricingError::UnknownZone(zone))
    }

    /// Distance in zone steps
    pub fn zone_distance(from_zone: ZoneId, to_zone: ZoneId) -> u32 {
        from_zone.abs_diff(to_zone)
    }

    /// Distance in km between two zones
    pub fn zone_distance_km(&self, from_zone: ZoneId, to_zone: ZoneId) -> Decimal {
        Decimal::from(Self::zone_distance(from_zone, to_zone)) * self.config.zone_spacing_km
    }

    /// Effective rate for energy flowing `from_zone` -> `to_zone`.
    ///
    /// Both zones must be known. A cached rate in either direction wins
    /// over the default schedule.
    pub async fn rate_for(&self, from_zone: ZoneId, to_zone: ZoneId) -> Result<ZoneRate, PricingError> {
        self.ensure_zone(from_zone).await?;
        self.ensure_zone(to_zone).await?;

        let cache = self.rates_cache.read().await;
        if let Some(rate) = cache.get(&(from_zone, to_zone)) {
            return Ok(rate.clone());
        }
        if let Some(rate) = cache.get(&(to_zone, from_zone)) {
            return Ok(rate.reversed());
        }
        drop(cache);

        Ok(Self::default_rate(from_zone, to_zone))
    }

    /// Default distance-based schedule (fallback)
    pub fn default_rate(from_zone: ZoneId, to_zone: ZoneId) -> ZoneRate {
        let distance = Self::zone_distance(from_zone, to_zone);
        ZoneRate {
            from_zone_id: from_zone,
            to_zone_id: to_zone,
            wheeling_charge: Self::default_wheeling_charge(distance),
            loss_factor: Self::default_loss_factor(distance),
        }
    }

    /// Wheeling charge per kWh for a zone distance
    fn default_wheeling_charge(distance: u32) -> Decimal {
        match distance {
            // Same zone: local distribution only
            0 => Decimal::ZERO,
            // Adjacent zone
            1 => Decimal::ONE,
            // Cross-zone transmission
            d => Decimal::new(150, 2) + Decimal::from(d) * Decimal::new(10, 2),
        }
    }

    /// Technical loss fraction for a zone distance
    fn default_loss_factor(distance: u32) -> Decimal {
        match distance {
            0 => Decimal::new(1, 2),
            1 => Decimal::new(3, 2),
            d => (Decimal::new(3, 2) + Decimal::from(d) * Decimal::new(1, 2))
                .min(max_default_loss_factor()),
        }
    }

    /// Current market prices and the default transmission schedule
    pub fn market_prices(&self) -> P2PMarketPrices {
        let wheeling_charges = BTreeMap::from([
            ("intra_zone".to_string(), Self::default_wheeling_charge(0)),
            ("adjacent_zone".to_string(), Self::default_wheeling_charge(1)),
            ("cross_zone_base".to_string(), Decimal::new(150, 2)),
            ("cross_zone_per_step".to_string(), Decimal::new(10, 2)),
        ]);
        let loss_factors = BTreeMap::from([
            ("intra_zone".to_string(), Self::default_loss_factor(0)),
            ("adjacent_zone".to_string(), Self::default_loss_factor(1)),
            ("cross_zone_per_step".to_string(), Decimal::new(1, 2)),
            ("cross_zone_max".to_string(), max_default_loss_factor()),
        ]);

        P2PMarketPrices {
            base_price_kwh: self.config.base_price,
            grid_import_price_kwh: self.config.grid_import_price,
            grid_export_price_kwh: self.config.grid_export_price,
            loss_allocation_model: self.config.loss_allocation,
            wheeling_charges,
            loss_factors,
        }
    }
}

impl std::fmt::Debug for GridTopologyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridTopologyService")
            .field("has_source", &self.source.is_some())
            .field("zones", &self.config.zones)
            .finish()
    }
}
