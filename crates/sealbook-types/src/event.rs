//! Events emitted by the engine for indexers and other external consumers.
//!
//! Each event carries just enough data to rebuild the order store from
//! the event stream alone. Events are only published when the call that
//! produced them succeeds.

use serde::{Deserialize, Serialize};

use crate::{AccountId, BatchId, Commitment, OrderId, OrderSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    OrderCommitted {
        order_id: OrderId,
        commitment: Commitment,
    },
    OrderRevealed {
        order_id: OrderId,
        owner: AccountId,
        amount: u128,
        price: u128,
        side: OrderSide,
    },
    OrderCancelled {
        order_id: OrderId,
    },
    /// One order's share of a batch. `filled_total == amount` means closed.
    OrderFilled {
        order_id: OrderId,
        batch_id: BatchId,
        fill: u128,
        filled_total: u128,
        clearing_price: u128,
    },
    BatchExecuted {
        batch_id: BatchId,
        clearing_price: u128,
        matched_volume: u128,
    },
}

impl EngineEvent {
    /// The order this event concerns, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::OrderCommitted { order_id, .. }
            | Self::OrderRevealed { order_id, .. }
            | Self::OrderCancelled { order_id }
            | Self::OrderFilled { order_id, .. } => Some(*order_id),
            Self::BatchExecuted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serde_roundtrip_uses_snake_case() {
        let event = EngineEvent::OrderCancelled {
            order_id: OrderId(4),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("order_cancelled"), "Got: {json}");
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn batch_event_has_no_order() {
        let event = EngineEvent::BatchExecuted {
            batch_id: BatchId(1),
            clearing_price: 1000,
            matched_volume: 100,
        };
        assert_eq!(event.order_id(), None);
    }
}
