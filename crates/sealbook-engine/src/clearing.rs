//! Clearing math for caller-assembled batches.
//!
//! Everything here is pure: it takes a snapshot of the participating
//! orders and the reference price and returns a [`ClearingPlan`] or the
//! reason the batch must be rejected. Nothing is mutated, so the batch
//! executor can run the whole plan before touching the store or the
//! ledger.
//!
//! ## Algorithm
//!
//! 1. Sum open amount and notional (`remaining * limit`) per side
//! 2. Clearing price = total notional / total amount (truncating)
//! 3. Price must lie inside `reference ± max_deviation_bps` (inclusive)
//! 4. Matched volume = `min(buy amount, sell amount)`
//! 5. Walk participants in list order; each side draws from its own
//!    matched-volume budget
//! 6. Every filled buy has limit `>=` price and every filled sell `<=` price
//!
//! Step 5 gives the batch submitter control over who gets filled when one
//! side is oversubscribed. It is not price or time priority.

use sealbook_types::constants::BPS_DENOMINATOR;
use sealbook_types::{BlockHeight, Order, OrderId, OrderSide, Result, SealbookError};

/// One order's view for clearing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub order_id: OrderId,
    pub side: OrderSide,
    /// Limit price in engine units.
    pub limit: u128,
    /// Open quantity (`amount - filled`).
    pub remaining: u128,
}

impl Participant {
    #[must_use]
    pub fn new(order_id: OrderId, side: OrderSide, limit: u128, remaining: u128) -> Self {
        Self {
            order_id,
            side,
            limit,
            remaining,
        }
    }

    /// Check that `order` may take part in a batch at `now`.
    ///
    /// Returns `Ok(None)` for orders with nothing left to fill; they are
    /// skipped rather than rejected.
    ///
    /// # Errors
    /// `OrderNotEligible` if the order is unrevealed, cancelled, or has not
    /// matured since its commit.
    pub fn eligible(order: &Order, now: BlockHeight, delay: u64) -> Result<Option<Self>> {
        let not_eligible = |reason: &str| SealbookError::OrderNotEligible {
            order_id: order.id,
            reason: reason.to_string(),
        };
        let terms = order.terms.ok_or_else(|| not_eligible("not revealed"))?;
        if order.is_cancelled() {
            return Err(not_eligible("cancelled"));
        }
        if !order.is_mature(now, delay) {
            return Err(not_eligible("reveal delay not elapsed"));
        }
        let remaining = order.remaining();
        if remaining == 0 {
            return Ok(None);
        }
        Ok(Some(Self::new(order.id, terms.side, terms.price, remaining)))
    }

    fn notional(&self) -> Result<u128> {
        self.remaining
            .checked_mul(self.limit)
            .ok_or(SealbookError::ArithmeticOverflow {
                context: "participant notional",
            })
    }
}

/// Per-side aggregates of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub buy_amount: u128,
    pub buy_notional: u128,
    pub sell_amount: u128,
    pub sell_notional: u128,
}

impl BatchTotals {
    /// Aggregate a set of participants.
    pub fn from_participants(participants: &[Participant]) -> Result<Self> {
        let mut totals = Self::default();
        for p in participants {
            totals.accumulate(p)?;
        }
        Ok(totals)
    }

    pub fn accumulate(&mut self, p: &Participant) -> Result<()> {
        let overflow = SealbookError::ArithmeticOverflow {
            context: "batch totals",
        };
        let notional = p.notional()?;
        let (amount, total_notional) = match p.side {
            OrderSide::Buy => (&mut self.buy_amount, &mut self.buy_notional),
            OrderSide::Sell => (&mut self.sell_amount, &mut self.sell_notional),
        };
        let new_amount = amount.checked_add(p.remaining).ok_or(overflow.clone())?;
        let new_notional = total_notional.checked_add(notional).ok_or(overflow)?;
        *amount = new_amount;
        *total_notional = new_notional;
        Ok(())
    }

    /// Both sides carry open volume.
    #[must_use]
    pub fn is_two_sided(&self) -> bool {
        self.buy_amount > 0 && self.sell_amount > 0
    }

    /// Volume-weighted average of every participating limit price,
    /// truncated toward zero.
    pub fn clearing_price(&self) -> Result<u128> {
        if !self.is_two_sided() {
            return Err(SealbookError::NoValidOrders);
        }
        let overflow = SealbookError::ArithmeticOverflow {
            context: "clearing price",
        };
        let notional = self
            .buy_notional
            .checked_add(self.sell_notional)
            .ok_or(overflow.clone())?;
        let amount = self.buy_amount.checked_add(self.sell_amount).ok_or(overflow)?;
        Ok(notional / amount)
    }

    #[must_use]
    pub fn matched_volume(&self) -> u128 {
        self.buy_amount.min(self.sell_amount)
    }
}

/// Reject a clearing price outside `reference ± max_deviation_bps`.
/// Both bounds are inclusive.
pub fn check_band(
    clearing_price: u128,
    reference_price: u128,
    max_deviation_bps: u32,
) -> Result<()> {
    let overflow = SealbookError::ArithmeticOverflow {
        context: "price band",
    };
    let bps = u128::from(max_deviation_bps);
    let lower_factor = BPS_DENOMINATOR
        .checked_sub(bps)
        .ok_or(SealbookError::Configuration(format!(
            "max_deviation_bps {max_deviation_bps} exceeds {BPS_DENOMINATOR}"
        )))?;
    let upper_factor = BPS_DENOMINATOR + bps;

    let scaled = clearing_price
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(overflow.clone())?;
    let lower = reference_price
        .checked_mul(lower_factor)
        .ok_or(overflow.clone())?;
    let upper = reference_price.checked_mul(upper_factor).ok_or(overflow)?;

    if scaled < lower || scaled > upper {
        return Err(SealbookError::PriceDeviation {
            clearing_price,
            reference_price,
            max_deviation_bps,
        });
    }
    Ok(())
}

/// Reject the batch if any filled participant would trade at a worse
/// price than its limit. Participants without a fill are not checked.
pub fn check_limits(participants: &[Participant], fills: &[Fill], clearing_price: u128) -> Result<()> {
    let violator = participants
        .iter()
        .filter(|p| fills.iter().any(|f| f.order_id == p.order_id))
        .find(|p| match p.side {
            OrderSide::Buy => p.limit < clearing_price,
            OrderSide::Sell => p.limit > clearing_price,
        });
    match violator {
        Some(p) => Err(SealbookError::LimitPriceViolated {
            order_id: p.order_id,
            limit: p.limit,
            clearing_price,
        }),
        None => Ok(()),
    }
}

/// Quantity allotted to one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub qty: u128,
}

/// Hand out `matched_volume` to each side in list order.
///
/// Participants reached after their side's budget is spent get no fill.
#[must_use]
pub fn allocate_fills(participants: &[Participant], matched_volume: u128) -> Vec<Fill> {
    let mut buy_left = matched_volume;
    let mut sell_left = matched_volume;
    let mut fills = Vec::new();

    for p in participants {
        let budget = match p.side {
            OrderSide::Buy => &mut buy_left,
            OrderSide::Sell => &mut sell_left,
        };
        let qty = p.remaining.min(*budget);
        if qty == 0 {
            continue;
        }
        *budget -= qty;
        fills.push(Fill {
            order_id: p.order_id,
            side: p.side,
            qty,
        });
    }
    fills
}

/// Everything needed to settle a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearingPlan {
    pub clearing_price: u128,
    pub reference_price: u128,
    pub matched_volume: u128,
    pub totals: BatchTotals,
    pub fills: Vec<Fill>,
}

/// Run steps 1-6 over a set of eligible participants.
///
/// # Errors
/// - `NoValidOrders` if either side has no open volume
/// - `PriceDeviation` if the price leaves the oracle band
/// - `LimitPriceViolated` if a filled order's limit is worse than the price
/// - `ArithmeticOverflow` if a notional does not fit `u128`
pub fn plan_batch(
    participants: &[Participant],
    reference_price: u128,
    max_deviation_bps: u32,
) -> Result<ClearingPlan> {
    let totals = BatchTotals::from_participants(participants)?;
    let clearing_price = totals.clearing_price()?;
    check_band(clearing_price, reference_price, max_deviation_bps)?;

    let matched_volume = totals.matched_volume();
    let fills = allocate_fills(participants, matched_volume);
    check_limits(participants, &fills, clearing_price)?;

    Ok(ClearingPlan {
        clearing_price,
        reference_price,
        matched_volume,
        totals,
        fills,
    })
}
