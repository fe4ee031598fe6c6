//! Order types for the SealBook engine.
//!
//! An order starts as an opaque [`Commitment`]. Its [`OrderTerms`] are only
//! known once the owner reveals them, at which point collateral is locked
//! in engine custody.
//!
//! ## State Machine
//!
//! ```text
//!   COMMITTED ──reveal──▶ REVEALED ──fill──▶ PARTIALLY_FILLED ──fill──▶ FILLED
//!       │                    │  └──────────── full fill ──────────────────▲
//!       │ cancel             │ cancel (refund)
//!       ▼                    ▼
//!   CANCELLED ◀──────────────┘
//! ```
//!
//! `FILLED` and `CANCELLED` are terminal. Closed records are kept so that a
//! stale id never reads back as a blank order.

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, Asset, BlockHeight, Collateral, Commitment, OrderId, Result, SealbookError,
};

/// Which side of the market this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Commitment stored, terms hidden.
    Committed,
    /// Terms revealed and collateral locked; nothing filled yet.
    Revealed,
    /// Some, but not all, of the amount has been filled.
    PartiallyFilled,
    /// Fully filled. **Terminal.**
    Filled,
    /// Cancelled by the owner before any fill. **Terminal.**
    Cancelled,
}

impl OrderStatus {
    /// Can an order move from this status to `target`?
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Committed, Self::Revealed | Self::Cancelled)
                | (
                    Self::Revealed,
                    Self::PartiallyFilled | Self::Filled | Self::Cancelled
                )
                | (Self::PartiallyFilled, Self::PartiallyFilled | Self::Filled)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Committed => write!(f, "COMMITTED"),
            Self::Revealed => write!(f, "REVEALED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The terms an order commits to. Set exactly once, at reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerms {
    /// Quantity in base units.
    pub amount: u128,
    /// Limit price in the engine's canonical price units.
    pub price: u128,
    pub side: OrderSide,
}

impl OrderTerms {
    #[must_use]
    pub fn new(amount: u128, price: u128, side: OrderSide) -> Self {
        Self {
            amount,
            price,
            side,
        }
    }

    /// Reject terms that could never trade.
    pub fn validate(&self) -> Result<()> {
        if self.amount == 0 {
            return Err(SealbookError::InvalidOrderTerms {
                reason: "amount must be positive".to_string(),
            });
        }
        if self.price == 0 {
            return Err(SealbookError::InvalidOrderTerms {
                reason: "price must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// `amount * price` in quote units.
    ///
    /// Checked at reveal for both sides so a revealed order can always be
    /// summed into a batch.
    pub fn notional(&self) -> Result<u128> {
        self.amount
            .checked_mul(self.price)
            .ok_or(SealbookError::ArithmeticOverflow {
                context: "order notional",
            })
    }

    /// Collateral locked at reveal: buys lock `amount * price` quote,
    /// sells lock `amount` base.
    pub fn collateral(&self) -> Result<Collateral> {
        match self.side {
            OrderSide::Buy => Ok(Collateral::new(Asset::Quote, self.notional()?)),
            OrderSide::Sell => Ok(Collateral::new(Asset::Base, self.amount)),
        }
    }

    /// Asset the owner receives when this order fills.
    #[must_use]
    pub fn proceeds_asset(&self) -> Asset {
        match self.side {
            OrderSide::Buy => Asset::Base,
            OrderSide::Sell => Asset::Quote,
        }
    }
}

/// An order record held by the engine's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: AccountId,
    pub commitment: Commitment,
    /// Ordering position at commit; the maturity delay counts from here.
    pub commit_height: BlockHeight,
    pub status: OrderStatus,
    /// `None` until revealed.
    pub terms: Option<OrderTerms>,
    /// Base units filled so far. Never decreases, never exceeds `amount`.
    pub filled: u128,
    /// Collateral units still held in custody on behalf of this order.
    pub escrow: u128,
}

impl Order {
    /// A freshly committed order with hidden terms.
    #[must_use]
    pub fn committed(
        id: OrderId,
        owner: AccountId,
        commitment: Commitment,
        commit_height: BlockHeight,
    ) -> Self {
        Self {
            id,
            owner,
            commitment,
            commit_height,
            status: OrderStatus::Committed,
            terms: None,
            filled: 0,
            escrow: 0,
        }
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.terms.is_some()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Open quantity: `amount - filled`, zero while unrevealed.
    #[must_use]
    pub fn remaining(&self) -> u128 {
        self.terms
            .map_or(0, |terms| terms.amount.saturating_sub(self.filled))
    }

    /// First position at which the order may be revealed or cleared.
    /// `None` if it would overflow (the order never matures).
    #[must_use]
    pub fn matures_at(&self, delay: u64) -> Option<BlockHeight> {
        self.commit_height.checked_add(delay)
    }

    #[must_use]
    pub fn is_mature(&self, now: BlockHeight, delay: u64) -> bool {
        self.matures_at(delay).is_some_and(|at| now >= at)
    }

    /// Move to `target`, enforcing the lifecycle graph.
    pub fn transition(&mut self, target: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(SealbookError::Internal(format!(
                "illegal transition {} -> {} for {}",
                self.status, target, self.id
            )));
        }
        self.status = target;
        Ok(())
    }

    /// Record a fill of `qty` base units and advance the status.
    pub fn record_fill(&mut self, qty: u128) -> Result<()> {
        let terms = self
            .terms
            .ok_or_else(|| SealbookError::Internal(format!("fill on unrevealed {}", self.id)))?;
        let filled = self
            .filled
            .checked_add(qty)
            .filter(|f| *f <= terms.amount)
            .ok_or_else(|| {
                SealbookError::Internal(format!("overfill of {}: {} + {qty}", self.id, self.filled))
            })?;
        let target = if filled == terms.amount {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.transition(target)?;
        self.filled = filled;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A revealed order with collateral already escrowed.
    pub fn dummy_revealed(id: u64, side: OrderSide, amount: u128, price: u128) -> Self {
        let terms = OrderTerms::new(amount, price, side);
        let nonce = crate::Nonce::from_u64(id);
        Self {
            id: OrderId(id),
            owner: AccountId::from_label(&format!("trader-{id}")),
            commitment: Commitment::compute(amount, price, side, &nonce),
            commit_height: BlockHeight(0),
            status: OrderStatus::Revealed,
            terms: Some(terms),
            filled: 0,
            escrow: terms.collateral().map_or(0, |c| c.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_side_display() {
        assert_eq!(format!("{}", OrderSide::Buy), "BUY");
        assert_eq!(format!("{}", OrderSide::Sell), "SELL");
    }

    #[test]
    fn collateral_by_side() {
        let buy = OrderTerms::new(100, 1000, OrderSide::Buy);
        assert_eq!(buy.collateral().unwrap(), Collateral::new(Asset::Quote, 100_000));
        let sell = OrderTerms::new(100, 1000, OrderSide::Sell);
        assert_eq!(sell.collateral().unwrap(), Collateral::new(Asset::Base, 100));
        assert_eq!(buy.proceeds_asset(), Asset::Base);
        assert_eq!(sell.proceeds_asset(), Asset::Quote);
    }

    #[test]
    fn collateral_overflow_is_reported() {
        let terms = OrderTerms::new(u128::MAX, 2, OrderSide::Buy);
        assert!(matches!(
            terms.collateral(),
            Err(SealbookError::ArithmeticOverflow { .. })
        ));
        let sell = OrderTerms::new(u128::MAX, 2, OrderSide::Sell);
        assert!(sell.collateral().is_ok());
        assert!(matches!(
            sell.notional(),
            Err(SealbookError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn zero_terms_rejected() {
        assert!(OrderTerms::new(0, 10, OrderSide::Buy).validate().is_err());
        assert!(OrderTerms::new(10, 0, OrderSide::Sell).validate().is_err());
        assert!(OrderTerms::new(1, 1, OrderSide::Sell).validate().is_ok());
    }

    #[test]
    fn committed_order_is_blank() {
        let order = Order::committed(
            OrderId(1),
            AccountId::from_label("alice"),
            Commitment([1; 32]),
            BlockHeight(5),
        );
        assert!(!order.is_revealed());
        assert_eq!(order.remaining(), 0);
        assert_eq!(order.status, OrderStatus::Committed);
    }

    #[test]
    fn maturity_is_inclusive() {
        let order = Order::committed(
            OrderId(1),
            AccountId::from_label("alice"),
            Commitment([1; 32]),
            BlockHeight(10),
        );
        assert!(!order.is_mature(BlockHeight(11), 2));
        assert!(order.is_mature(BlockHeight(12), 2));
        assert!(order.is_mature(BlockHeight(13), 2));
    }

    #[test]
    fn maturity_overflow_never_matures() {
        let order = Order::committed(
            OrderId(1),
            AccountId::from_label("alice"),
            Commitment([1; 32]),
            BlockHeight(u64::MAX),
        );
        assert_eq!(order.matures_at(1), None);
        assert!(!order.is_mature(BlockHeight(u64::MAX), 1));
    }

    #[test]
    fn fills_advance_status() {
        let mut order = Order::dummy_revealed(1, OrderSide::Buy, 10, 100);
        order.record_fill(4).unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), 6);
        order.record_fill(6).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining(), 0);
    }

    #[test]
    fn overfill_rejected_without_change() {
        let mut order = Order::dummy_revealed(1, OrderSide::Sell, 10, 100);
        assert!(order.record_fill(11).is_err());
        assert_eq!(order.filled, 0);
        assert_eq!(order.status, OrderStatus::Revealed);
    }

    #[test]
    fn terminal_states_do_not_transition() {
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Revealed));
        assert!(!OrderStatus::PartiallyFilled.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Committed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Filled.is_terminal());
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = Order::dummy_revealed(3, OrderSide::Sell, 5, 70);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
