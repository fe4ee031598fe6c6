//! Assets of the single market an engine instance serves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two assets of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Asset {
    /// The asset being bought and sold (amounts are denominated in it).
    Base,
    /// The asset prices are denominated in.
    Quote,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "BASE"),
            Self::Quote => write!(f, "QUOTE"),
        }
    }
}

/// An amount of one asset, e.g. the collateral an order locks at reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collateral {
    pub asset: Asset,
    pub amount: u128,
}

impl Collateral {
    #[must_use]
    pub fn new(asset: Asset, amount: u128) -> Self {
        Self { asset, amount }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Collateral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}
