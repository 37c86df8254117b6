//! Application startup and initialization logic

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use crate::app_state::AppState;
use crate::config::Config;
use crate::services::{GatewayZoneRateSource, GridTopologyService};

/// Initialize services and create the AppState.
///
/// Installs the global Prometheus recorder when metrics are enabled, so
/// call it once per process.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    let metrics_handle = if config.metrics_enabled {
        Some(install_metrics_recorder()?)
    } else {
        info!("Metrics disabled");
        None
    };

    let grid_topology = Arc::new(build_grid_topology(config)?);
    if grid_topology.has_source() {
        grid_topology
            .clone()
            .spawn_refresh_task(config.zone_rates_refresh_secs);
    }

    Ok(AppState::new(config.clone(), grid_topology, metrics_handle))
}

/// Grid topology backed by the gateway when `ZONE_RATES_URL` is set
pub fn build_grid_topology(config: &Config) -> Result<GridTopologyService> {
    let pricing = config.pricing.clone();
    match &config.zone_rates_url {
        Some(url) => {
            let source = GatewayZoneRateSource::new(
                url.clone(),
                Duration::from_secs(config.gateway_timeout_secs),
            )?;
            info!("✅ Zone rates source: {}", url);
            Ok(GridTopologyService::with_source(pricing, Arc::new(source)))
        }
        None => {
            info!("✅ No zone rates source configured, pricing from the default schedule");
            Ok(GridTopologyService::new(pricing))
        }
    }
}

fn install_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");
    Ok(handle)
}
