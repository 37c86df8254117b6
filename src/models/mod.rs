// Request/response models for the pricing API

pub mod order_book;
pub mod p2p;
pub mod zone;

pub use order_book::{
    DepthLevel, DepthPoint, MarketDepthChart, OrderBookDepth, OrderBookRequest, OrderSide,
    PriceImpact, PriceImpactRequest, RestingOrder,
};
pub use p2p::{P2PCalculateCostRequest, P2PGridComparison, P2PMarketPrices, P2PTransactionCost};
pub use zone::{min_wheeling_charge, LossAllocation, ZoneId, ZoneRate};
