use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

pub mod pricing;
pub use pricing::{parse_zone_list, ConfigError, PricingConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    /// "pretty" or "json"
    pub log_format: String,
    pub request_timeout: u64,
    /// Gateway endpoint serving the active zone-rate table; default schedule only when unset
    pub zone_rates_url: Option<String>,
    pub zone_rates_refresh_secs: u64,
    pub gateway_timeout_secs: u64,
    pub metrics_enabled: bool,
    pub pricing: PricingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8090,
            log_format: "pretty".to_string(),
            request_timeout: 30,
            zone_rates_url: None,
            zone_rates_refresh_secs: 300,
            gateway_timeout_secs: 10,
            metrics_enabled: true,
            pricing: PricingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let port = parse_port(env::var("PORT").ok())?;

        let zone_rates_refresh_secs = env::var("ZONE_RATES_REFRESH_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);
        if zone_rates_refresh_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "ZONE_RATES_REFRESH_SECS must be greater than zero".to_string(),
            )
            .into());
        }

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port,
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            zone_rates_url: env::var("ZONE_RATES_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            zone_rates_refresh_secs,
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            metrics_enabled: env::var("METRICS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            pricing: PricingConfig::from_env()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Listening port from `PORT`, 8090 when unset
fn parse_port(value: Option<String>) -> std::result::Result<u16, ConfigError> {
    match value {
        Some(val) => val.trim().parse().map_err(|_| {
            ConfigError::ValidationFailed(format!("PORT must be a valid port number, got '{}'", val))
        }),
        None => Ok(8090),
    }
}
