use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// A resting buy/sell intent at a given price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestingOrder {
    pub side: OrderSide,
    /// Price per kWh
    pub price: Decimal,
    /// Remaining amount in kWh
    pub amount: Decimal,
}

impl RestingOrder {
    pub fn new(side: OrderSide, price: Decimal, amount: Decimal) -> Self {
        Self { side, price, amount }
    }
}

/// Aggregated price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepthLevel {
    pub price: Decimal,
    pub volume: Decimal,
    pub order_count: usize,
    /// Volume at this level and every better level
    pub cumulative_volume: Decimal,
}

/// Order book depth response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderBookDepth {
    /// Bids, highest price first
    pub bids: Vec<DepthLevel>,
    /// Asks, lowest price first
    pub asks: Vec<DepthLevel>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub mid_price: Option<Decimal>,
    pub spread: Option<Decimal>,
    pub spread_percentage: Option<Decimal>,
    pub total_buy_volume: Decimal,
    pub total_sell_volume: Decimal,
}

/// Market depth chart data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketDepthChart {
    pub cumulative_bids: Vec<DepthPoint>,
    pub cumulative_asks: Vec<DepthPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepthPoint {
    pub price: Decimal,
    pub cumulative_volume: Decimal,
}

/// Snapshot of resting orders to aggregate
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct OrderBookRequest {
    #[validate(length(max = 10000, message = "At most 10000 orders per request"))]
    pub orders: Vec<RestingOrder>,
}

/// Hypothetical taker fill against a snapshot of resting orders
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PriceImpactRequest {
    #[validate(length(max = 10000, message = "At most 10000 orders per request"))]
    pub orders: Vec<RestingOrder>,
    /// Side of the hypothetical taker order
    pub side: OrderSide,
    /// Amount to fill in kWh
    pub amount: Decimal,
}

/// Result of walking the book for a hypothetical fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceImpact {
    pub side: OrderSide,
    pub requested_amount: Decimal,
    pub filled_amount: Decimal,
    pub unfilled_amount: Decimal,
    pub fully_filled: bool,
    pub levels_consumed: usize,
    /// Best opposite quote before the fill
    pub best_price: Option<Decimal>,
    /// Last price level touched
    pub worst_price: Option<Decimal>,
    /// Volume-weighted average execution price
    pub average_price: Option<Decimal>,
    pub total_value: Decimal,
    /// |average - best| / best × 100
    pub price_impact_percent: Option<Decimal>,
}
