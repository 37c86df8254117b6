//! P2P transaction cost estimation
//!
//! [`compute_cost`] is a pure function of the request, the zone rate and
//! the pricing policy. [`P2PCostService`] resolves the rate from the grid
//! topology and adds metrics around it.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::config::PricingConfig;
use crate::error::PricingError;
use crate::models::{
    P2PCalculateCostRequest, P2PGridComparison, P2PMarketPrices, P2PTransactionCost, ZoneRate,
};

use super::grid_topology::GridTopologyService;

/// Smallest tradable amount in kWh (0.000001)
pub fn min_energy_amount() -> Decimal {
    Decimal::new(1, 6)
}

/// Whether `amount` is large enough to price
pub fn is_tradable_amount(amount: Decimal) -> bool {
    amount >= min_energy_amount()
}

fn checked_product(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or_else(|| PricingError::overflow(what))
}

fn checked_sum(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or_else(|| PricingError::overflow(what))
}

/// Compute the delivered cost of a P2P trade.
///
/// Returns `Ok(None)` when the energy amount is below
/// [`min_energy_amount`]; there is nothing to price in that case. Amounts
/// whose cost does not fit a `Decimal` fail with [`PricingError::Overflow`].
pub fn compute_cost(
    request: &P2PCalculateCostRequest,
    rate: &ZoneRate,
    zone_distance_km: Decimal,
    pricing: &PricingConfig,
) -> Result<Option<P2PTransactionCost>, PricingError> {
    let energy_amount = request.energy_amount;
    if !is_tradable_amount(energy_amount) {
        return Ok(None);
    }

    let price = match request.agreed_price {
        Some(p) if p <= Decimal::ZERO => return Err(PricingError::InvalidPrice(p)),
        Some(p) => p,
        None => pricing.base_price,
    };

    let energy_cost = checked_product(energy_amount, price, "energy cost")?;
    let wheeling_charge = checked_product(energy_amount, rate.wheeling_charge, "wheeling charge")?;
    let loss_factor = rate.loss_factor;
    // Loss Cost = Energy * LossFactor * EnergyPrice
    let loss_cost = checked_product(energy_cost, loss_factor, "loss cost")?;
    // loss_factor is in [0, 1), so this never exceeds energy_amount
    let effective_energy = energy_amount * (Decimal::ONE - loss_factor);
    let total_cost = checked_sum(energy_cost, wheeling_charge, "total cost")
        .and_then(|subtotal| checked_sum(subtotal, loss_cost, "total cost"))?;

    let grid_violation_reason = if loss_factor > pricing.max_loss_factor {
        Some(format!(
            "Transmission loss {}% exceeds the {}% limit",
            (loss_factor * Decimal::ONE_HUNDRED).normalize(),
            (pricing.max_loss_factor * Decimal::ONE_HUNDRED).normalize()
        ))
    } else if zone_distance_km > pricing.max_transmission_distance_km {
        Some(format!(
            "Zone distance {} km exceeds the {} km limit",
            zone_distance_km.normalize(),
            pricing.max_transmission_distance_km.normalize()
        ))
    } else {
        None
    };

    Ok(Some(P2PTransactionCost {
        energy_cost,
        wheeling_charge,
        loss_cost,
        total_cost,
        effective_energy,
        loss_factor,
        loss_allocation: pricing.loss_allocation,
        zone_distance_km,
        buyer_zone: request.buyer_zone_id,
        seller_zone: request.seller_zone_id,
        is_grid_compliant: grid_violation_reason.is_none(),
        grid_violation_reason,
    }))
}

/// Compare a P2P trade of `energy_amount` kWh against the main grid
pub fn compare_with_grid(
    energy_amount: Decimal,
    cost: P2PTransactionCost,
    pricing: &PricingConfig,
) -> Result<P2PGridComparison, PricingError> {
    let grid_import_cost = checked_product(energy_amount, pricing.grid_import_price, "grid import cost")?;
    let grid_export_value = checked_product(energy_amount, pricing.grid_export_price, "grid export value")?;

    let buyer_savings = grid_import_cost
        .checked_sub(cost.total_cost)
        .ok_or_else(|| PricingError::overflow("buyer savings"))?;
    let seller_premium = cost
        .energy_cost
        .checked_sub(grid_export_value)
        .ok_or_else(|| PricingError::overflow("seller premium"))?;

    Ok(P2PGridComparison {
        grid_import_cost,
        grid_export_value,
        buyer_savings,
        seller_premium,
        is_p2p_beneficial_for_buyer: buyer_savings > Decimal::ZERO,
        is_p2p_beneficial_for_seller: seller_premium > Decimal::ZERO,
        p2p_transaction: cost,
    })
}

/// Estimates P2P trade costs against the live zone-rate table
#[derive(Clone, Debug)]
pub struct P2PCostService {
    topology: Arc<GridTopologyService>,
}

impl P2PCostService {
    pub fn new(topology: Arc<GridTopologyService>) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &Arc<GridTopologyService> {
        &self.topology
    }

    /// Calculate the full cost breakdown; `Ok(None)` for an untradable amount
    #[instrument(skip(self), fields(buyer = request.buyer_zone_id, seller = request.seller_zone_id))]
    pub async fn calculate_cost(
        &self,
        request: &P2PCalculateCostRequest,
    ) -> Result<Option<P2PTransactionCost>, PricingError> {
        if !is_tradable_amount(request.energy_amount) {
            debug!("Skipping cost calculation for untradable amount");
            return Ok(None);
        }

        // Energy flows seller -> buyer
        let rate = self
            .topology
            .rate_for(request.seller_zone_id, request.buyer_zone_id)
            .await?;
        let distance_km = self
            .topology
            .zone_distance_km(request.seller_zone_id, request.buyer_zone_id);

        let cost = compute_cost(request, &rate, distance_km, self.topology.config())?;

        if let Some(cost) = &cost {
            let compliant = if cost.is_grid_compliant { "true" } else { "false" };
            metrics::counter!("p2p_cost_calculations_total", "grid_compliant" => compliant)
                .increment(1);
            debug!(
                "P2P cost: energy={}, wheeling={}, loss_factor={}, loss_cost={}, total={}",
                cost.energy_cost, cost.wheeling_charge, cost.loss_factor, cost.loss_cost, cost.total_cost
            );
        }

        Ok(cost)
    }

    /// Cost breakdown plus the grid import/export reference
    pub async fn compare_with_grid(
        &self,
        request: &P2PCalculateCostRequest,
    ) -> Result<Option<P2PGridComparison>, PricingError> {
        let Some(cost) = self.calculate_cost(request).await? else {
            return Ok(None);
        };
        compare_with_grid(request.energy_amount, cost, self.topology.config()).map(Some)
    }

    pub fn market_prices(&self) -> P2PMarketPrices {
        self.topology.market_prices()
    }
}
