use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::handlers::{market_data, p2p, zones};

/// P2P transaction cost & pricing
fn p2p_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate-cost", post(p2p::calculate_p2p_cost))
        .route("/compare", post(p2p::compare_p2p_with_grid))
        .route("/market-prices", get(p2p::get_p2p_market_prices))
}

fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(zones::list_zone_rates))
        .route("/rates/refresh", post(zones::refresh_zone_rates))
        .route("/rates/{from}/{to}", get(zones::get_zone_rate))
}

fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/depth", post(market_data::get_order_book_depth))
        .route("/depth-chart", post(market_data::get_market_depth_chart))
        .route("/price-impact", post(market_data::get_price_impact))
}

/// Build the v1 API routes
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/p2p", p2p_routes())       // POST /api/v1/p2p/calculate-cost
        .nest("/zones", zone_routes())    // GET /api/v1/zones/rates/{from}/{to}
        .nest("/market", market_routes()) // POST /api/v1/market/price-impact
}
