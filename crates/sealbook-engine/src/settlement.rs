//! Custody movements: locking collateral, paying fills, refunding escrow.
//!
//! Record updates and fund movements are split. [`apply_fill`] mutates an
//! order record and returns the [`Payout`]s it implies; the caller applies
//! every record update of a call first and only then hands the payouts to
//! the ledger with [`pay_out`].
//!
//! ```text
//!   buy  fill q @ p:  custody ──q BASE──▶ buyer      escrow(QUOTE) −= q·p
//!   sell fill q @ p:  custody ──q·p QUOTE──▶ seller  escrow(BASE)  −= q
//!   order closes:     custody ──escrow──▶ owner      escrow = 0
//! ```

use serde::{Deserialize, Serialize};
use sealbook_ledger::Ledger;
use sealbook_types::{AccountId, Asset, Collateral, Order, OrderId, OrderSide, Result, SealbookError};

use crate::engine::transfer_failed;

/// Why custody is paying an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    /// Counter-asset received for a fill.
    Proceeds,
    /// Unused collateral returned on close or cancel.
    Refund,
}

/// One transfer out of custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub order_id: OrderId,
    pub to: AccountId,
    pub asset: Asset,
    pub amount: u128,
    pub kind: PayoutKind,
}

/// Record a fill of `qty` at `clearing_price` on `order` and return what
/// custody owes the owner.
///
/// # Errors
/// - `ArithmeticOverflow` if `qty * clearing_price` does not fit
/// - `Internal` if the fill would overdraw the order's escrow or amount
pub fn apply_fill(order: &mut Order, qty: u128, clearing_price: u128) -> Result<Vec<Payout>> {
    let terms = order
        .terms
        .ok_or_else(|| SealbookError::Internal(format!("fill on unrevealed {}", order.id)))?;
    let quote_value = qty
        .checked_mul(clearing_price)
        .ok_or(SealbookError::ArithmeticOverflow {
            context: "fill value",
        })?;

    let (proceeds, cost) = match terms.side {
        OrderSide::Buy => (qty, quote_value),
        OrderSide::Sell => (quote_value, qty),
    };
    let escrow = order.escrow.checked_sub(cost).ok_or_else(|| {
        SealbookError::Internal(format!(
            "{} escrow {} cannot cover {cost}",
            order.id, order.escrow
        ))
    })?;

    order.record_fill(qty)?;
    order.escrow = escrow;

    let mut payouts = vec![Payout {
        order_id: order.id,
        to: order.owner,
        asset: terms.proceeds_asset(),
        amount: proceeds,
        kind: PayoutKind::Proceeds,
    }];
    if order.is_filled() {
        payouts.extend(release_escrow(order)?);
    }

    tracing::debug!(
        order_id = %order.id,
        side = %terms.side,
        qty,
        clearing_price,
        filled = order.filled,
        status = %order.status,
        "fill applied"
    );
    Ok(payouts)
}

/// Zero out `order`'s escrow and return the refund, if any.
pub fn release_escrow(order: &mut Order) -> Result<Option<Payout>> {
    let Some(terms) = order.terms else {
        return Ok(None);
    };
    let amount = std::mem::take(&mut order.escrow);
    if amount == 0 {
        return Ok(None);
    }
    Ok(Some(Payout {
        order_id: order.id,
        to: order.owner,
        asset: terms.collateral()?.asset,
        amount,
        kind: PayoutKind::Refund,
    }))
}

/// Pull `collateral` from `owner` into custody against the allowance the
/// owner granted to the custody account.
pub fn lock<L: Ledger>(
    ledger: &mut L,
    custody: AccountId,
    owner: AccountId,
    collateral: Collateral,
) -> Result<()> {
    if collateral.is_zero() {
        return Ok(());
    }
    ledger
        .transfer_from(collateral.asset, custody, owner, custody, collateral.amount)
        .map_err(transfer_failed)?;
    tracing::debug!(%owner, %collateral, "collateral locked");
    Ok(())
}

/// Execute payouts from custody in order. Stops at the first failure.
pub fn pay_out<L: Ledger>(ledger: &mut L, custody: AccountId, payouts: &[Payout]) -> Result<()> {
    for payout in payouts.iter().filter(|p| p.amount > 0) {
        if let Err(err) = ledger.transfer(payout.asset, custody, payout.to, payout.amount) {
            tracing::warn!(
                order_id = %payout.order_id,
                to = %payout.to,
                asset = %payout.asset,
                amount = payout.amount,
                error = %err,
                "payout failed"
            );
            return Err(transfer_failed(err));
        }
    }
    Ok(())
}
