//! The external price reference port.

use rust_decimal::Decimal;
use sealbook_types::{BlockHeight, OracleReading, Result, SealbookError};

/// Independent, out-of-process price source.
///
/// The engine queries it once per batch and uses only the numeric price
/// (plus `updated_at` when a maximum age is configured).
pub trait PriceOracle {
    fn latest_price(&self) -> Result<OracleReading>;
}

/// An oracle that reports whatever price it was last given.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    reading: Option<OracleReading>,
}

impl StaticOracle {
    #[must_use]
    pub fn new(price: Decimal, updated_at: BlockHeight) -> Self {
        Self {
            reading: Some(OracleReading::new(price, updated_at)),
        }
    }

    /// An oracle that has never published.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, price: Decimal, updated_at: BlockHeight) {
        self.reading = Some(OracleReading::new(price, updated_at));
    }
}

impl PriceOracle for StaticOracle {
    fn latest_price(&self) -> Result<OracleReading> {
        self.reading.ok_or_else(|| SealbookError::InvalidOracle {
            reason: "no price published".to_string(),
        })
    }
}
