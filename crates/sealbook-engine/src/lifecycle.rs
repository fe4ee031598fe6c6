//! Order lifecycle: `commit`, `reveal`, `cancel`.
//!
//! Preconditions are checked in a fixed order and the first failure wins.
//! Record updates happen before any ledger call; a ledger failure rolls
//! both back.

use sealbook_ledger::{Ledger, PriceOracle};
use sealbook_types::{
    BlockHeight, Commitment, EngineEvent, Nonce, OrderId, OrderSide, OrderStatus, OrderTerms, Result,
    SealbookError,
};

use crate::{CallContext, Engine, UpgradeGate, settlement};

impl<L: Ledger, O: PriceOracle, G: UpgradeGate> Engine<L, O, G> {
    /// Store a sealed order for `ctx.caller`. The commitment is opaque and
    /// not validated.
    pub fn commit(&mut self, ctx: &CallContext, commitment: Commitment) -> OrderId {
        let id = self
            .store
            .insert_committed(ctx.caller, commitment, ctx.height);
        tracing::debug!(order_id = %id, owner = %ctx.caller, height = %ctx.height, "order committed");
        self.publish(EngineEvent::OrderCommitted {
            order_id: id,
            commitment,
        });
        id
    }

    /// Open a commitment and lock the order's collateral in custody.
    ///
    /// # Errors
    /// In check order: `OrderNotFound`, `NotOwner`, `AlreadyRevealed`,
    /// `Cancelled`, `DelayNotElapsed`, `InvalidCommitment`,
    /// `InvalidOrderTerms`, then `ArithmeticOverflow` if `amount * price`
    /// does not fit (either side) and `TransferFailed` if the lock fails.
    pub fn reveal(
        &mut self,
        ctx: &CallContext,
        id: OrderId,
        amount: u128,
        price: u128,
        side: OrderSide,
        nonce: &Nonce,
    ) -> Result<()> {
        let delay = self.config.reveal_delay;
        let order = self.store.require(id)?;
        if order.owner != ctx.caller {
            return Err(SealbookError::NotOwner {
                order_id: id,
                caller: ctx.caller,
            });
        }
        if order.is_revealed() {
            return Err(SealbookError::AlreadyRevealed(id));
        }
        if order.is_cancelled() {
            return Err(SealbookError::Cancelled(id));
        }
        if !order.is_mature(ctx.height, delay) {
            return Err(SealbookError::DelayNotElapsed {
                order_id: id,
                matures_at: order
                    .matures_at(delay)
                    .unwrap_or(BlockHeight(u64::MAX)),
                current: ctx.height,
            });
        }
        if !order.commitment.opens_with(amount, price, side, nonce) {
            tracing::debug!(order_id = %id, "commitment mismatch");
            return Err(SealbookError::InvalidCommitment(id));
        }
        let terms = OrderTerms::new(amount, price, side);
        terms.validate()?;
        terms.notional()?;
        let collateral = terms.collateral()?;
        let owner = order.owner;

        self.atomically("reveal", |engine, staged| {
            let order = engine
                .store
                .get_mut(id)
                .ok_or(SealbookError::OrderNotFound(id))?;
            staged.touch(order);
            order.transition(OrderStatus::Revealed)?;
            order.terms = Some(terms);
            order.escrow = collateral.amount;
            staged.emit(EngineEvent::OrderRevealed {
                order_id: id,
                owner,
                amount,
                price,
                side,
            });

            let custody = engine.config.custody;
            settlement::lock(&mut engine.ledger, custody, owner, collateral)
        })?;

        tracing::debug!(order_id = %id, %side, amount, price, %collateral, "order revealed");
        Ok(())
    }

    /// Cancel an order with no fills. A revealed order gets its locked
    /// collateral back.
    ///
    /// # Errors
    /// In check order: `OrderNotFound`, `NotOwner`, `AlreadyCancelled`,
    /// `PartiallyFilled` (any fill, including a full one), then
    /// `TransferFailed` if the refund fails.
    pub fn cancel(&mut self, ctx: &CallContext, id: OrderId) -> Result<()> {
        let order = self.store.require(id)?;
        if order.owner != ctx.caller {
            return Err(SealbookError::NotOwner {
                order_id: id,
                caller: ctx.caller,
            });
        }
        if order.is_cancelled() {
            return Err(SealbookError::AlreadyCancelled(id));
        }
        if order.filled > 0 {
            return Err(SealbookError::PartiallyFilled {
                order_id: id,
                filled: order.filled,
            });
        }

        let refund = self.atomically("cancel", |engine, staged| {
            let order = engine
                .store
                .get_mut(id)
                .ok_or(SealbookError::OrderNotFound(id))?;
            staged.touch(order);
            order.transition(OrderStatus::Cancelled)?;
            let refund = settlement::release_escrow(order)?;
            staged.emit(EngineEvent::OrderCancelled { order_id: id });

            let custody = engine.config.custody;
            settlement::pay_out(&mut engine.ledger, custody, refund.as_slice())?;
            Ok(refund)
        })?;

        tracing::debug!(
            order_id = %id,
            refund = refund.map_or(0, |p| p.amount),
            "order cancelled"
        );
        Ok(())
    }
}
