use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PricingError;

/// Grid zone identifier
pub type ZoneId = i32;

/// Which side of a P2P trade absorbs the transmission loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LossAllocation {
    /// Buyer receives less than was sold
    Buyer,
    /// Seller injects extra energy to cover the loss
    Seller,
}

impl fmt::Display for LossAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossAllocation::Buyer => write!(f, "buyer"),
            LossAllocation::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for LossAllocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The gateway still reports RECEIVER / SENDER
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" | "receiver" => Ok(LossAllocation::Buyer),
            "seller" | "sender" => Ok(LossAllocation::Seller),
            other => Err(format!("unknown loss allocation model: {}", other)),
        }
    }
}

/// Smallest cross-zone wheeling charge accepted per kWh (0.0001)
pub fn min_wheeling_charge() -> Decimal {
    Decimal::new(1, 4)
}

/// Transmission rate between two grid zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ZoneRate {
    pub from_zone_id: ZoneId,
    pub to_zone_id: ZoneId,
    /// Wheeling charge per kWh transmitted
    pub wheeling_charge: Decimal,
    /// Fractional technical loss (0.03 = 3%)
    pub loss_factor: Decimal,
}

impl ZoneRate {
    /// Check the rate against the topology invariants.
    ///
    /// Same-zone rates carry no wheeling charge, cross-zone rates carry at
    /// least [`min_wheeling_charge`], and the loss factor stays in `[0, 1)`.
    pub fn validate(&self) -> Result<(), PricingError> {
        let invalid = |reason: &str| PricingError::InvalidZoneRate {
            from: self.from_zone_id,
            to: self.to_zone_id,
            reason: reason.to_string(),
        };

        if self.loss_factor < Decimal::ZERO || self.loss_factor >= Decimal::ONE {
            return Err(invalid("loss factor must be within [0, 1)"));
        }
        if self.is_intra_zone() {
            if !self.wheeling_charge.is_zero() {
                return Err(invalid("intra-zone wheeling charge must be zero"));
            }
        } else if self.wheeling_charge < min_wheeling_charge() {
            return Err(invalid("cross-zone wheeling charge must be at least 0.0001 per kWh"));
        }
        Ok(())
    }

    pub fn is_intra_zone(&self) -> bool {
        self.from_zone_id == self.to_zone_id
    }

    /// Same rate viewed in the opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            from_zone_id: self.to_zone_id,
            to_zone_id: self.from_zone_id,
            ..self.clone()
        }
    }
}
