//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::services::{GridTopologyService, P2PCostService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Zone-rate cache and default distance schedule
    pub grid_topology: Arc<GridTopologyService>,
    /// P2P transaction cost estimator
    pub p2p_cost: P2PCostService,
    /// Prometheus render handle; `None` when metrics are disabled
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Config,
        grid_topology: Arc<GridTopologyService>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let p2p_cost = P2PCostService::new(grid_topology.clone());
        Self {
            config,
            grid_topology,
            p2p_cost,
            metrics_handle,
        }
    }
}
