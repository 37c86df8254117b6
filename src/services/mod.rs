// Pricing services
// Grid topology cache, P2P cost estimation, order book analytics

pub mod grid_topology;
pub mod order_book;
pub mod p2p_cost;
pub mod zone_rate_source;

pub use grid_topology::GridTopologyService;
pub use order_book::{aggregate_depth, estimate_price_impact, OrderBook};
pub use p2p_cost::{compare_with_grid, compute_cost, P2PCostService};
pub use zone_rate_source::{GatewayZoneRateSource, ZoneRateSource};
