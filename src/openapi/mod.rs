use utoipa::OpenApi;

use crate::error::{ErrorCode, ErrorDetail, ErrorResponse};
use crate::handlers::{HealthStatus, ZoneRatesHealth, ZoneRatesRefreshResponse, ZoneRatesResponse};
use crate::models::{
    DepthLevel, DepthPoint, LossAllocation, MarketDepthChart, OrderBookDepth, OrderBookRequest,
    OrderSide, P2PCalculateCostRequest, P2PGridComparison, P2PMarketPrices, P2PTransactionCost,
    PriceImpact, PriceImpactRequest, RestingOrder, ZoneRate,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridTokenX P2P Pricing API",
        description = "Transaction cost estimation and order book analytics for P2P energy trading",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8090", description = "Local development server")
    ),
    paths(
        // Health
        crate::handlers::health::health_check,
        crate::handlers::metrics::get_prometheus_metrics,

        // P2P cost
        crate::handlers::p2p::calculate_p2p_cost,
        crate::handlers::p2p::compare_p2p_with_grid,
        crate::handlers::p2p::get_p2p_market_prices,

        // Zone rates
        crate::handlers::zones::list_zone_rates,
        crate::handlers::zones::get_zone_rate,
        crate::handlers::zones::refresh_zone_rates,

        // Market data
        crate::handlers::market_data::get_order_book_depth,
        crate::handlers::market_data::get_market_depth_chart,
        crate::handlers::market_data::get_price_impact,
    ),
    components(
        schemas(
            HealthStatus,
            ZoneRatesHealth,
            ZoneRatesResponse,
            ZoneRatesRefreshResponse,
            ZoneRate,
            LossAllocation,
            P2PCalculateCostRequest,
            P2PTransactionCost,
            P2PGridComparison,
            P2PMarketPrices,
            OrderSide,
            RestingOrder,
            OrderBookRequest,
            PriceImpactRequest,
            DepthLevel,
            DepthPoint,
            OrderBookDepth,
            MarketDepthChart,
            PriceImpact,
            ErrorResponse,
            ErrorDetail,
            ErrorCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "metrics", description = "Prometheus exposition"),
        (name = "p2p", description = "P2P transaction cost estimation"),
        (name = "zones", description = "Grid zone wheeling charges and loss factors"),
        (name = "Market Data", description = "Order book depth and price impact"),
    )
)]
pub struct ApiDoc;
