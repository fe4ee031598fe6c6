//! Reference price readings and their conversion into engine price units.
//!
//! Oracles report a [`Decimal`] in whatever precision they like. The engine
//! prices everything as integers with `price_decimals` fractional digits,
//! so a reading is rescaled (truncating toward zero) before any comparison.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{BlockHeight, Result, SealbookError, constants};

/// A single reading from the external price reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleReading {
    /// Quote units per base unit.
    pub price: Decimal,
    /// Ordering position at which the oracle last updated.
    pub updated_at: BlockHeight,
}

impl OracleReading {
    #[must_use]
    pub fn new(price: Decimal, updated_at: BlockHeight) -> Self {
        Self { price, updated_at }
    }

    /// Convert the reading into engine price units.
    ///
    /// # Errors
    /// `InvalidOracle` if the price is non-positive, or truncates to zero,
    /// or does not fit the engine's integer range.
    pub fn to_engine_units(&self, price_decimals: u32) -> Result<u128> {
        if self.price <= Decimal::ZERO {
            return Err(SealbookError::InvalidOracle {
                reason: format!("non-positive price {}", self.price),
            });
        }
        if price_decimals > constants::MAX_PRICE_DECIMALS {
            return Err(SealbookError::Configuration(format!(
                "price_decimals {price_decimals} exceeds {}",
                constants::MAX_PRICE_DECIMALS
            )));
        }

        let scale = Decimal::from(10u64.pow(price_decimals));
        let units = self
            .price
            .checked_mul(scale)
            .map(|scaled| scaled.trunc())
            .and_then(|scaled| scaled.to_u128())
            .ok_or_else(|| SealbookError::InvalidOracle {
                reason: format!("price {} out of range at {price_decimals} decimals", self.price),
            })?;

        if units == 0 {
            return Err(SealbookError::InvalidOracle {
                reason: format!("price {} truncates to zero", self.price),
            });
        }
        Ok(units)
    }

    /// Age of the reading at `now`, in ordering positions.
    #[must_use]
    pub fn age(&self, now: BlockHeight) -> u64 {
        now.since(self.updated_at)
    }
}
