//! Supply conservation invariant checker.
//!
//! Invariant enforced by the in-memory ledger:
//! ```text
//! ∀ asset: Σ balances == Σ deposits − Σ withdrawals
//! ```
//!
//! Transfers, reveals, cancels, and batch settlements only move funds
//! between accounts, so none of them may change an asset's total.

use std::collections::HashMap;

use sealbook_types::{Asset, Result, SealbookError};

/// Tracks per-asset mint/burn totals and validates conservation.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total deposits per asset since genesis.
    deposits: HashMap<Asset, u128>,
    /// Total withdrawals per asset since genesis.
    withdrawals: HashMap<Asset, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, asset: Asset, amount: u128) {
        let total = self.deposits.entry(asset).or_insert(0);
        *total = total.saturating_add(amount);
    }

    pub fn record_withdrawal(&mut self, asset: Asset, amount: u128) {
        let total = self.withdrawals.entry(asset).or_insert(0);
        *total = total.saturating_add(amount);
    }

    /// Expected total supply for an asset: deposits − withdrawals.
    #[must_use]
    pub fn expected_supply(&self, asset: Asset) -> u128 {
        self.total_deposits(asset)
            .saturating_sub(self.total_withdrawals(asset))
    }

    /// Compare the actual supply (sum of all balances) with the expected one.
    ///
    /// # Errors
    /// Returns [`SealbookError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: Asset, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(SealbookError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {asset}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(asset),
                    self.total_withdrawals(asset),
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_deposits(&self, asset: Asset) -> u128 {
        self.deposits.get(&asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: Asset) -> u128 {
        self.withdrawals.get(&asset).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(Asset::Base), 0);
        assert!(sc.verify(Asset::Base, 0).is_ok());
    }

    #[test]
    fn deposits_and_withdrawals_net_out() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(Asset::Quote, 1000);
        sc.record_deposit(Asset::Quote, 500);
        sc.record_withdrawal(Asset::Quote, 300);
        assert_eq!(sc.expected_supply(Asset::Quote), 1200);
        assert!(sc.verify(Asset::Quote, 1200).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(Asset::Base, 10);
        let err = sc.verify(Asset::Base, 11).unwrap_err();
        assert!(matches!(
            err,
            SealbookError::SupplyInvariantViolation { .. }
        ));
    }

    #[test]
    fn assets_tracked_independently() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(Asset::Base, 5);
        sc.record_deposit(Asset::Quote, 50_000);
        assert!(sc.verify(Asset::Base, 5).is_ok());
        assert!(sc.verify(Asset::Quote, 50_000).is_ok());
        assert!(sc.verify(Asset::Base, 50_000).is_err());
    }
}
