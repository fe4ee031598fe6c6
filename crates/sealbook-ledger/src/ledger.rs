//! The asset ledger port.

use sealbook_types::{AccountId, Asset, Result};

/// Balance-holding collaborator.
///
/// Mirrors a token contract: `transfer` moves funds owned by the calling
/// account, `transfer_from` moves another account's funds against an
/// allowance granted to `spender`. Each call either completes fully or
/// fails with no effect.
///
/// ## Atomic scopes
///
/// The execution platform runs every engine call to completion or reverts
/// it entirely. That revert is exposed here as a scope: the engine opens
/// one with [`begin_scope`](Ledger::begin_scope) before its first transfer
/// and closes it with [`commit_scope`](Ledger::commit_scope) on success or
/// [`revert_scope`](Ledger::revert_scope) on failure, which must undo
/// every transfer made inside the scope. Scopes do not nest.
pub trait Ledger {
    /// Move `amount` of `asset` from `from` (the calling account) to `to`.
    fn transfer(&mut self, asset: Asset, from: AccountId, to: AccountId, amount: u128)
    -> Result<()>;

    /// Move `amount` of `asset` from `from` to `to`, spending the
    /// allowance `from` granted to `spender`.
    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()>;

    /// Current balance of `account` in `asset`.
    fn balance_of(&self, asset: Asset, account: AccountId) -> u128;

    /// Open an atomic scope.
    fn begin_scope(&mut self);

    /// Keep everything done since `begin_scope`.
    fn commit_scope(&mut self);

    /// Undo everything done since `begin_scope`.
    fn revert_scope(&mut self);
}
