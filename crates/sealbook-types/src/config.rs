//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{AccountId, MarketPair, Result, SealbookError, constants};

/// Configuration for a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The pair this engine clears.
    pub market: MarketPair,
    /// Ledger account that holds all locked collateral.
    pub custody: AccountId,
    /// Blocks between commit and the earliest reveal / clearing.
    pub reveal_delay: u64,
    /// Maximum ids per `execute_batch` call.
    pub max_batch_size: usize,
    /// Allowed clearing-price deviation from the oracle, in basis points.
    pub max_deviation_bps: u32,
    /// Fractional digits of the canonical price unit.
    pub price_decimals: u32,
    /// Reject oracle readings older than this many blocks. `None` accepts
    /// any age.
    pub max_oracle_age: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market: MarketPair::new("BASE", "QUOTE"),
            custody: AccountId::from_label("sealbook:custody"),
            reveal_delay: constants::DEFAULT_REVEAL_DELAY_BLOCKS,
            max_batch_size: constants::DEFAULT_MAX_BATCH_SIZE,
            max_deviation_bps: constants::DEFAULT_MAX_DEVIATION_BPS,
            price_decimals: constants::DEFAULT_PRICE_DECIMALS,
            max_oracle_age: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(SealbookError::Configuration(
                "max_batch_size must be > 0".to_string(),
            ));
        }
        if u128::from(self.max_deviation_bps) >= constants::BPS_DENOMINATOR {
            return Err(SealbookError::Configuration(format!(
                "max_deviation_bps {} must be below {}",
                self.max_deviation_bps,
                constants::BPS_DENOMINATOR
            )));
        }
        if self.price_decimals > constants::MAX_PRICE_DECIMALS {
            return Err(SealbookError::Configuration(format!(
                "price_decimals {} exceeds {}",
                self.price_decimals,
                constants::MAX_PRICE_DECIMALS
            )));
        }
        if self.market.base == self.market.quote {
            return Err(SealbookError::Configuration(format!(
                "market {} must have distinct assets",
                self.market
            )));
        }
        Ok(())
    }
}
