use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{LossAllocation, ZoneId};

/// Market and grid policy used by the P2P cost estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Market price per kWh used when no price was agreed (default: 3.50)
    pub base_price: Decimal,

    /// Price per kWh when buying from the main grid (default: 4.50)
    pub grid_import_price: Decimal,

    /// Feed-in rate per kWh when selling to the main grid (default: 2.20)
    pub grid_export_price: Decimal,

    /// Party absorbing transmission losses (default: buyer)
    pub loss_allocation: LossAllocation,

    /// Zones accepted in requests (default: 1..=5)
    pub zones: BTreeSet<ZoneId>,

    /// Distance represented by one zone step in km (default: 5)
    pub zone_spacing_km: Decimal,

    /// Largest loss factor a compliant transfer may incur (default: 0.10)
    pub max_loss_factor: Decimal,

    /// Longest compliant transmission distance in km (default: 50)
    pub max_transmission_distance_km: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price: Decimal::new(350, 2),
            grid_import_price: Decimal::new(450, 2),
            grid_export_price: Decimal::new(220, 2),
            loss_allocation: LossAllocation::Buyer,
            zones: (1..=5).collect(),
            zone_spacing_km: Decimal::from(5),
            max_loss_factor: Decimal::new(10, 2),
            max_transmission_distance_km: Decimal::from(50),
        }
    }
}

impl PricingConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(price) = positive_decimal_var("P2P_BASE_PRICE") {
            config.base_price = price;
            info!("Using custom P2P base price: {}", price);
        }
        if let Some(price) = positive_decimal_var("GRID_IMPORT_PRICE") {
            config.grid_import_price = price;
            info!("Using custom grid import price: {}", price);
        }
        if let Some(price) = positive_decimal_var("GRID_EXPORT_PRICE") {
            config.grid_export_price = price;
            info!("Using custom grid export price: {}", price);
        }

        if let Ok(val) = env::var("LOSS_ALLOCATION_MODEL") {
            match val.parse::<LossAllocation>() {
                Ok(model) => {
                    config.loss_allocation = model;
                    info!("Using loss allocation model: {}", model);
                }
                Err(e) => warn!("{}, using default", e),
            }
        }

        if let Ok(val) = env::var("GRID_ZONES") {
            match parse_zone_list(&val) {
                Ok(zones) if !zones.is_empty() => {
                    info!("Using configured grid zones: {:?}", zones);
                    config.zones = zones;
                }
                Ok(_) => warn!("GRID_ZONES is empty, using default zones"),
                Err(e) => warn!("Failed to parse GRID_ZONES '{}': {}, using default", val, e),
            }
        }

        if let Some(km) = positive_decimal_var("ZONE_SPACING_KM") {
            config.zone_spacing_km = km;
        }
        if let Some(limit) = positive_decimal_var("MAX_LOSS_FACTOR") {
            config.max_loss_factor = limit;
        }
        if let Some(km) = positive_decimal_var("MAX_TRANSMISSION_DISTANCE_KM") {
            config.max_transmission_distance_km = km;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Invalid pricing configuration: {}", e))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.base_price <= Decimal::ZERO {
            return Err(ConfigError::ValidationFailed(
                "base price must be positive".to_string(),
            ));
        }
        if self.grid_export_price > self.grid_import_price {
            return Err(ConfigError::IncompatibleValues(format!(
                "grid export price {} exceeds grid import price {}",
                self.grid_export_price, self.grid_import_price
            )));
        }
        if self.zones.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one grid zone is required".to_string(),
            ));
        }
        if self.max_loss_factor <= Decimal::ZERO || self.max_loss_factor >= Decimal::ONE {
            return Err(ConfigError::ValidationFailed(
                "max loss factor must be within (0, 1)".to_string(),
            ));
        }
        if self.zone_spacing_km <= Decimal::ZERO {
            return Err(ConfigError::ValidationFailed(
                "zone spacing must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive_decimal_var(name: &str) -> Option<Decimal> {
    let val = env::var(name).ok()?;
    match Decimal::from_str(val.trim()) {
        Ok(d) if d > Decimal::ZERO => Some(d),
        Ok(_) => {
            warn!("Invalid {}: {}, must be > 0, using default", name, val);
            None
        }
        Err(_) => {
            warn!("Failed to parse {}: {}, using default", name, val);
            None
        }
    }
}

/// Parse "1,2,3" or "1-5" (or a mix such as "1-3,7")
pub fn parse_zone_list(value: &str) -> std::result::Result<BTreeSet<ZoneId>, String> {
    let mut zones = BTreeSet::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: ZoneId = start.trim().parse().map_err(|_| format!("bad zone '{}'", start))?;
                let end: ZoneId = end.trim().parse().map_err(|_| format!("bad zone '{}'", end))?;
                if start > end {
                    return Err(format!("empty zone range {}", part));
                }
                zones.extend(start..=end);
            }
            None => {
                zones.insert(part.parse().map_err(|_| format!("bad zone '{}'", part))?);
            }
        }
    }
    Ok(zones)
}

/// Errors that can occur during configuration loading
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Incompatible configuration values: {0}")]
    IncompatibleValues(String),
}
