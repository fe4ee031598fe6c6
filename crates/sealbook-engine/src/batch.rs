//! `execute_batch`: clear a caller-supplied list of orders.
//!
//! The whole batch is validated and planned before anything changes. Only
//! a complete [`ClearingPlan`] is applied: first every order record, then
//! every payout. Any failure, including a failed payout, reverts the lot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sealbook_ledger::{Ledger, PriceOracle};
use sealbook_types::{
    AccountId, BatchId, EngineEvent, OrderId, OrderSide, OrderStatus, Result, SealbookError,
};

use crate::clearing::{ClearingPlan, Participant, plan_batch};
use crate::settlement::{self, PayoutKind};
use crate::{CallContext, Engine, UpgradeGate};

/// What one order got out of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub side: OrderSide,
    /// Base units filled in this batch.
    pub fill: u128,
    /// Base units filled over the order's lifetime.
    pub filled_total: u128,
    pub status: OrderStatus,
    /// Counter-asset paid to the owner for this fill.
    pub proceeds: u128,
    /// Escrow returned because the order closed.
    pub refund: u128,
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub clearing_price: u128,
    /// Oracle price in engine units at execution time.
    pub reference_price: u128,
    pub matched_volume: u128,
    pub fills: Vec<FillReport>,
}

impl BatchReport {
    /// The fill line for `id`, if it received one.
    #[must_use]
    pub fn fill_for(&self, id: OrderId) -> Option<&FillReport> {
        self.fills.iter().find(|f| f.order_id == id)
    }
}

impl<L: Ledger, O: PriceOracle, G: UpgradeGate> Engine<L, O, G> {
    /// Clear `ids` at one volume-weighted price. Any caller may submit a
    /// batch; fills are handed out in list order.
    ///
    /// # Errors
    /// In check order: `BatchTooLarge`, `DuplicateOrderInBatch`,
    /// `InvalidOracle`, `OrderNotFound`, `OrderNotEligible`,
    /// `NoValidOrders`, `PriceDeviation`, `LimitPriceViolated`, then
    /// `TransferFailed` if a payout fails.
    pub fn execute_batch(&mut self, ctx: &CallContext, ids: &[OrderId]) -> Result<BatchReport> {
        let result = self.plan(ctx, ids).and_then(|plan| self.settle(plan));
        match &result {
            Ok(report) => tracing::info!(
                batch_id = %report.batch_id,
                orders = ids.len(),
                clearing_price = report.clearing_price,
                reference_price = report.reference_price,
                matched_volume = report.matched_volume,
                fills = report.fills.len(),
                "batch executed"
            ),
            Err(err) => tracing::warn!(
                caller = %ctx.caller,
                orders = ids.len(),
                error = %err,
                "batch rejected"
            ),
        }
        result
    }

    /// Validate the request and compute the plan. Read-only.
    fn plan(&self, ctx: &CallContext, ids: &[OrderId]) -> Result<ClearingPlan> {
        if ids.len() > self.config.max_batch_size {
            return Err(SealbookError::BatchTooLarge {
                size: ids.len(),
                max: self.config.max_batch_size,
            });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(SealbookError::DuplicateOrderInBatch(*dup));
        }

        let reference_price = self.reference_price(ctx)?;

        let mut participants = Vec::with_capacity(ids.len());
        for &id in ids {
            let order = self.store.require(id)?;
            if let Some(p) = Participant::eligible(order, ctx.height, self.config.reveal_delay)? {
                participants.push(p);
            }
        }

        plan_batch(&participants, reference_price, self.config.max_deviation_bps)
    }

    /// Query the oracle once and convert it into engine price units.
    fn reference_price(&self, ctx: &CallContext) -> Result<u128> {
        let reading = self.oracle.latest_price().map_err(|err| match err {
            SealbookError::InvalidOracle { .. } => err,
            other => SealbookError::InvalidOracle {
                reason: other.to_string(),
            },
        })?;
        if let Some(max_age) = self.config.max_oracle_age {
            let age = reading.age(ctx.height);
            if age > max_age {
                return Err(SealbookError::InvalidOracle {
                    reason: format!(
                        "reading from {} is {age} blocks old, max {max_age}",
                        reading.updated_at
                    ),
                });
            }
        }
        reading.to_engine_units(self.config.price_decimals)
    }

    /// Apply a plan: records and events first, then payouts.
    fn settle(&mut self, plan: ClearingPlan) -> Result<BatchReport> {
        self.atomically("execute_batch", |engine, staged| {
            let batch_id = engine.store.next_batch_id();
            let clearing_price = plan.clearing_price;
            let mut payouts = Vec::new();
            let mut fills = Vec::with_capacity(plan.fills.len());

            for fill in &plan.fills {
                let order = engine
                    .store
                    .get_mut(fill.order_id)
                    .ok_or(SealbookError::OrderNotFound(fill.order_id))?;
                staged.touch(order);
                let owed = settlement::apply_fill(order, fill.qty, clearing_price)?;

                let sum = |kind: PayoutKind| {
                    owed.iter()
                        .filter(|p| p.kind == kind)
                        .map(|p| p.amount)
                        .sum::<u128>()
                };
                fills.push(FillReport {
                    order_id: order.id,
                    owner: order.owner,
                    side: fill.side,
                    fill: fill.qty,
                    filled_total: order.filled,
                    status: order.status,
                    proceeds: sum(PayoutKind::Proceeds),
                    refund: sum(PayoutKind::Refund),
                });
                staged.emit(EngineEvent::OrderFilled {
                    order_id: order.id,
                    batch_id,
                    fill: fill.qty,
                    filled_total: order.filled,
                    clearing_price,
                });
                payouts.extend(owed);
            }

            let custody = engine.config.custody;
            settlement::pay_out(&mut engine.ledger, custody, &payouts)?;

            engine.store.advance_batch();
            staged.emit(EngineEvent::BatchExecuted {
                batch_id,
                clearing_price,
                matched_volume: plan.matched_volume,
            });

            Ok(BatchReport {
                batch_id,
                clearing_price,
                reference_price: plan.reference_price,
                matched_volume: plan.matched_volume,
                fills,
            })
        })
    }
}
