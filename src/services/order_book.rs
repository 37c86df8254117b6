//! Order book depth aggregation and price-impact estimation

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::PricingError;
use crate::models::{
    DepthLevel, DepthPoint, MarketDepthChart, OrderBookDepth, OrderSide, PriceImpact, RestingOrder,
};

/// Decimal places kept on derived prices and percentages
const PRICE_SCALE: u32 = 8;

/// Price level in the order book
#[derive(Debug, Clone)]
struct PriceLevel {
    price: Decimal,
    total_volume: Decimal,
    order_count: usize,
}

impl PriceLevel {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            total_volume: Decimal::ZERO,
            order_count: 0,
        }
    }

    fn add(&mut self, amount: Decimal) {
        self.total_volume += amount;
        self.order_count += 1;
    }
}

/// Read-only order book built from a snapshot of resting orders
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    // BTreeMap sorts ascending: iterate in reverse for bids
    buy_levels: BTreeMap<Decimal, PriceLevel>,
    sell_levels: BTreeMap<Decimal, PriceLevel>,
    // Every level and cumulative volume on a side is bounded by its total
    buy_volume: Decimal,
    sell_volume: Decimal,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] when a side's total volume does not fit a `Decimal`
    pub fn from_orders<'a>(
        orders: impl IntoIterator<Item = &'a RestingOrder>,
    ) -> Result<Self, PricingError> {
        let mut book = Self::new();
        let mut skipped = 0usize;
        for order in orders {
            if !book.add_order(order)? {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Ignored {} orders with non-positive price or amount", skipped);
        }
        Ok(book)
    }

    /// Add order to the book; orders with non-positive price or amount are ignored
    pub fn add_order(&mut self, order: &RestingOrder) -> Result<bool, PricingError> {
        if order.price <= Decimal::ZERO || order.amount <= Decimal::ZERO {
            return Ok(false);
        }

        let (levels, side_volume) = match order.side {
            OrderSide::Buy => (&mut self.buy_levels, &mut self.buy_volume),
            OrderSide::Sell => (&mut self.sell_levels, &mut self.sell_volume),
        };
        *side_volume = side_volume
            .checked_add(order.amount)
            .ok_or_else(|| PricingError::overflow("order book volume"))?;
        levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price))
            .add(order.amount);
        Ok(true)
    }

    /// Levels of one side, best price first
    fn levels(&self, side: OrderSide) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match side {
            OrderSide::Buy => Box::new(self.buy_levels.values().rev()),
            OrderSide::Sell => Box::new(self.sell_levels.values()),
        }
    }

    /// Get best bid (highest buy price)
    pub fn best_bid(&self) -> Option<Decimal> {
        self.buy_levels.keys().next_back().copied()
    }

    /// Get best ask (lowest sell price)
    pub fn best_ask(&self) -> Option<Decimal> {
        self.sell_levels.keys().next().copied()
    }

    /// Calculate mid-market price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(bid + (ask - bid) / Decimal::TWO),
            _ => None,
        }
    }

    /// Get spread (difference between best ask and best bid)
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Spread relative to the best bid, in percent
    pub fn spread_percentage(&self) -> Result<Option<Decimal>, PricingError> {
        let (Some(bid), Some(spread)) = (self.best_bid(), self.spread()) else {
            return Ok(None);
        };
        percent_of(spread, bid, "spread percentage").map(Some)
    }

    /// Aggregated levels for one side with cumulative volume, best price first
    pub fn depth(&self, side: OrderSide) -> Vec<DepthLevel> {
        let mut cumulative_volume = Decimal::ZERO;
        self.levels(side)
            .map(|level| {
                cumulative_volume += level.total_volume;
                DepthLevel {
                    price: level.price,
                    volume: level.total_volume,
                    order_count: level.order_count,
                    cumulative_volume,
                }
            })
            .collect()
    }

    pub fn total_volume(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.buy_volume,
            OrderSide::Sell => self.sell_volume,
        }
    }

    /// Full depth snapshot
    pub fn snapshot(&self) -> Result<OrderBookDepth, PricingError> {
        Ok(OrderBookDepth {
            bids: self.depth(OrderSide::Buy),
            asks: self.depth(OrderSide::Sell),
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            mid_price: self.mid_price(),
            spread: self.spread(),
            spread_percentage: self.spread_percentage()?,
            total_buy_volume: self.total_volume(OrderSide::Buy),
            total_sell_volume: self.total_volume(OrderSide::Sell),
        })
    }

    /// Cumulative depth curves
    pub fn depth_chart(&self) -> MarketDepthChart {
        let to_points = |levels: Vec<DepthLevel>| {
            levels
                .into_iter()
                .map(|l| DepthPoint {
                    price: l.price,
                    cumulative_volume: l.cumulative_volume,
                })
                .collect()
        };

        MarketDepthChart {
            cumulative_bids: to_points(self.depth(OrderSide::Buy)),
            cumulative_asks: to_points(self.depth(OrderSide::Sell)),
        }
    }

    /// Walk the opposite side for a hypothetical taker order of `amount`.
    ///
    /// A buy consumes asks from the lowest price up, a sell consumes bids
    /// from the highest price down. Returns `Ok(None)` for a non-positive
    /// amount and [`PricingError::Overflow`] when the fill value does not fit.
    pub fn price_impact(
        &self,
        side: OrderSide,
        amount: Decimal,
    ) -> Result<Option<PriceImpact>, PricingError> {
        if amount <= Decimal::ZERO {
            return Ok(None);
        }

        let mut remaining = amount;
        let mut total_value = Decimal::ZERO;
        let mut levels_consumed = 0usize;
        let mut best_price = None;
        let mut worst_price = None;

        for level in self.levels(side.opposite()) {
            if remaining.is_zero() {
                break;
            }
            best_price.get_or_insert(level.price);

            let fill = remaining.min(level.total_volume);
            total_value = fill
                .checked_mul(level.price)
                .and_then(|value| total_value.checked_add(value))
                .ok_or_else(|| PricingError::overflow("fill value"))?;
            remaining -= fill;
            levels_consumed += 1;
            worst_price = Some(level.price);
        }

        let filled_amount = amount - remaining;
        // Lies between the best and worst filled prices
        let average_price = (!filled_amount.is_zero())
            .then(|| (total_value / filled_amount).round_dp(PRICE_SCALE));
        let price_impact_percent = match (average_price, best_price) {
            (Some(avg), Some(best)) => Some(percent_of((avg - best).abs(), best, "price impact")?),
            _ => None,
        };

        Ok(Some(PriceImpact {
            side,
            requested_amount: amount,
            filled_amount,
            unfilled_amount: remaining,
            fully_filled: remaining.is_zero(),
            levels_consumed,
            best_price,
            worst_price,
            average_price,
            total_value,
            price_impact_percent,
        }))
    }
}

/// `part / whole` in percent, rounded to [`PRICE_SCALE`]
fn percent_of(part: Decimal, whole: Decimal, what: &str) -> Result<Decimal, PricingError> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(PRICE_SCALE))
        .ok_or_else(|| PricingError::overflow(what))
}

/// Aggregate resting orders into a depth snapshot
pub fn aggregate_depth(orders: &[RestingOrder]) -> Result<OrderBookDepth, PricingError> {
    OrderBook::from_orders(orders)?.snapshot()
}

/// Price impact of a hypothetical fill against resting orders
pub fn estimate_price_impact(
    orders: &[RestingOrder],
    side: OrderSide,
    amount: Decimal,
) -> Result<Option<PriceImpact>, PricingError> {
    OrderBook::from_orders(orders)?.price_impact(side, amount)
}
