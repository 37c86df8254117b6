use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::zone::{LossAllocation, ZoneId};

// =============================================================================
// P2P Transaction Types
// =============================================================================

/// Request for calculating P2P transaction cost
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct P2PCalculateCostRequest {
    /// Buyer's zone ID
    pub buyer_zone_id: ZoneId,

    /// Seller's zone ID
    pub seller_zone_id: ZoneId,

    /// Amount of energy to trade in kWh
    pub energy_amount: Decimal,

    /// Negotiated price per kWh (optional, defaults to market base price)
    #[validate(custom(function = "validate_positive_price"))]
    pub agreed_price: Option<Decimal>,
}

fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut err = ValidationError::new("positive_price");
        err.message = Some("Agreed price must be positive".into());
        return Err(err);
    }
    Ok(())
}

/// Complete breakdown of a P2P energy transaction cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct P2PTransactionCost {
    /// Price × amount
    pub energy_cost: Decimal,

    /// Zone-based transmission fee
    pub wheeling_charge: Decimal,

    /// Monetized energy loss
    pub loss_cost: Decimal,

    /// Sum of all costs
    pub total_cost: Decimal,

    /// Energy received after losses (kWh)
    pub effective_energy: Decimal,

    /// Loss fraction applied
    pub loss_factor: Decimal,

    /// Party absorbing the loss
    pub loss_allocation: LossAllocation,

    /// Distance between zones (km)
    pub zone_distance_km: Decimal,

    pub buyer_zone: ZoneId,
    pub seller_zone: ZoneId,

    /// Whether the transfer stays within grid loss and distance limits
    pub is_grid_compliant: bool,

    /// First violated grid limit, if any
    pub grid_violation_reason: Option<String>,
}

/// Market pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct P2PMarketPrices {
    /// Base P2P energy price per kWh
    pub base_price_kwh: Decimal,

    /// Price when buying from main grid per kWh
    pub grid_import_price_kwh: Decimal,

    /// Feed-in rate when selling to main grid per kWh
    pub grid_export_price_kwh: Decimal,

    pub loss_allocation_model: LossAllocation,

    /// Default wheeling schedule (e.g., "intra_zone": 0)
    pub wheeling_charges: BTreeMap<String, Decimal>,

    /// Default loss schedule (e.g., "intra_zone": 0.01)
    pub loss_factors: BTreeMap<String, Decimal>,
}

/// P2P vs Grid price comparison
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct P2PGridComparison {
    pub p2p_transaction: P2PTransactionCost,

    /// Cost if buying the same amount from the grid
    pub grid_import_cost: Decimal,

    /// Value if selling the same amount to the grid
    pub grid_export_value: Decimal,

    /// Buyer savings with P2P vs grid import
    pub buyer_savings: Decimal,

    /// Seller premium with P2P vs grid export
    pub seller_premium: Decimal,

    pub is_p2p_beneficial_for_buyer: bool,
    pub is_p2p_beneficial_for_seller: bool,
}
