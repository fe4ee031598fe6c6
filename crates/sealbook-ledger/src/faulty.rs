//! Fault-injecting ledger wrapper for failure-atomicity tests.

use sealbook_types::{AccountId, Asset, Result, SealbookError};

use crate::Ledger;

/// Wraps a ledger and fails the N-th mutating call (0-based), or every
/// call touching a blocked account.
#[derive(Debug, Clone)]
pub struct FaultyLedger<L> {
    inner: L,
    calls: usize,
    fail_at: Option<usize>,
    blocked: Vec<AccountId>,
}

impl<L: Ledger> FaultyLedger<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: 0,
            fail_at: None,
            blocked: Vec::new(),
        }
    }

    /// Fail the `n`-th mutating call from now on (0-based, counted from
    /// the moment this is set).
    pub fn fail_call(&mut self, n: usize) {
        self.calls = 0;
        self.fail_at = Some(n);
    }

    /// Fail every transfer that debits or credits `account`.
    pub fn block(&mut self, account: AccountId) {
        self.blocked.push(account);
    }

    pub fn clear_faults(&mut self) {
        self.fail_at = None;
        self.blocked.clear();
    }

    /// Mutating calls observed since the last `fail_call`.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    fn check(&mut self, from: AccountId, to: AccountId) -> Result<()> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(SealbookError::TransferFailed {
                reason: format!("injected fault on call {call}"),
            });
        }
        if self.blocked.contains(&from) || self.blocked.contains(&to) {
            return Err(SealbookError::TransferFailed {
                reason: "account blocked".to_string(),
            });
        }
        Ok(())
    }
}

impl<L: Ledger> Ledger for FaultyLedger<L> {
    fn transfer(
        &mut self,
        asset: Asset,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.check(from, to)?;
        self.inner.transfer(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.check(from, to)?;
        self.inner.transfer_from(asset, spender, from, to, amount)
    }

    fn balance_of(&self, asset: Asset, account: AccountId) -> u128 {
        self.inner.balance_of(asset, account)
    }

    fn begin_scope(&mut self) {
        self.inner.begin_scope();
    }

    fn commit_scope(&mut self) {
        self.inner.commit_scope();
    }

    fn revert_scope(&mut self) {
        self.inner.revert_scope();
    }
}
