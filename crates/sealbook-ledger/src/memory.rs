//! In-memory ledger.
//!
//! Tracks per-(account, asset) balances and per-(owner, spender, asset)
//! allowances. All mutations are atomic: every check runs before any
//! balance is touched, so a failed call leaves the ledger unchanged.
//!
//! Scopes are backed by an undo journal: while a scope is open, every
//! balance or allowance write first records the previous value. Deposits
//! and withdrawals are administrative and bypass the journal.

use std::collections::HashMap;

use sealbook_types::{AccountId, Asset, Result, SealbookError};

use crate::{Ledger, SupplyConservation};

/// A self-contained [`Ledger`] for tests, simulations, and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(AccountId, Asset), u128>,
    allowances: HashMap<(AccountId, AccountId, Asset), u128>,
    supply: SupplyConservation,
    /// Undo log of the open scope, newest last.
    journal: Option<Vec<JournalEntry>>,
}

#[derive(Debug, Clone)]
enum JournalEntry {
    Balance((AccountId, Asset), Option<u128>),
    Allowance((AccountId, AccountId, Asset), Option<u128>),
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint funds into an account.
    pub fn deposit(&mut self, account: AccountId, asset: Asset, amount: u128) -> Result<()> {
        let entry = self.balances.entry((account, asset)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(SealbookError::ArithmeticOverflow { context: "deposit" })?;
        self.supply.record_deposit(asset, amount);
        Ok(())
    }

    /// Burn funds from an account.
    pub fn withdraw(&mut self, account: AccountId, asset: Asset, amount: u128) -> Result<()> {
        let entry = self.balances.entry((account, asset)).or_insert(0);
        if *entry < amount {
            return Err(SealbookError::InsufficientBalance {
                needed: amount,
                available: *entry,
            });
        }
        *entry -= amount;
        self.supply.record_withdrawal(asset, amount);
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s `asset`.
    /// Overwrites any previous allowance.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, asset: Asset, amount: u128) {
        self.allowances.insert((owner, spender, asset), amount);
    }

    #[must_use]
    pub fn allowance(&self, owner: AccountId, spender: AccountId, asset: Asset) -> u128 {
        self.allowances
            .get(&(owner, spender, asset))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances of an asset.
    #[must_use]
    pub fn total_supply(&self, asset: Asset) -> u128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .fold(0u128, u128::saturating_add)
    }

    /// Check `Σ balances == Σ deposits − Σ withdrawals` for one asset.
    pub fn verify_supply(&self, asset: Asset) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset))
    }

    /// Debit `from` and credit `to` after validating both sides.
    fn move_funds(
        &mut self,
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(SealbookError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(SealbookError::ArithmeticOverflow { context: "transfer" })?;

        self.set_balance((from, asset), available - amount);
        self.set_balance((to, asset), credited);
        Ok(())
    }

    /// Whether a scope is currently open.
    #[must_use]
    pub fn in_scope(&self) -> bool {
        self.journal.is_some()
    }

    fn set_balance(&mut self, key: (AccountId, Asset), value: u128) {
        let prev = self.balances.insert(key, value);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(JournalEntry::Balance(key, prev));
        }
    }

    fn set_allowance(&mut self, key: (AccountId, AccountId, Asset), value: u128) {
        let prev = self.allowances.insert(key, value);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(JournalEntry::Allowance(key, prev));
        }
    }
}

impl Ledger for InMemoryLedger {
    fn transfer(
        &mut self,
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.move_funds(asset, from, to, amount)?;
        tracing::trace!(%asset, %from, %to, amount, "ledger transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        let allowed = self.allowance(from, spender, asset);
        if allowed < amount {
            return Err(SealbookError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }
        self.move_funds(asset, from, to, amount)?;
        self.set_allowance((from, spender, asset), allowed - amount);
        tracing::trace!(%asset, %spender, %from, %to, amount, "ledger transfer_from");
        Ok(())
    }

    fn balance_of(&self, asset: Asset, account: AccountId) -> u128 {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }

    fn begin_scope(&mut self) {
        if self.journal.is_some() {
            tracing::warn!("begin_scope while a scope is open; merging into it");
            return;
        }
        self.journal = Some(Vec::new());
    }

    fn commit_scope(&mut self) {
        self.journal = None;
    }

    fn revert_scope(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let undone = journal.len();
        for entry in journal.into_iter().rev() {
            match entry {
                JournalEntry::Balance(key, Some(prev)) => {
                    self.balances.insert(key, prev);
                }
                JournalEntry::Balance(key, None) => {
                    self.balances.remove(&key);
                }
                JournalEntry::Allowance(key, Some(prev)) => {
                    self.allowances.insert(key, prev);
                }
                JournalEntry::Allowance(key, None) => {
                    self.allowances.remove(&key);
                }
            }
        }
        tracing::debug!(undone, "ledger scope reverted");
    }
}
