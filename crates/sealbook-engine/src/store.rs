//! The order store.
//!
//! One owned value holds every order record plus the id and batch
//! counters. It is the engine's entire persisted state: an upgrade hands
//! it from the old engine to the new one unchanged.
//!
//! Ids start at 1 and are dense, so records live in a `Vec` indexed by
//! `id - 1`. Records are never removed; closed orders keep their terminal
//! status.

use serde::{Deserialize, Serialize};
use sealbook_types::{
    AccountId, Asset, BatchId, BlockHeight, Commitment, Order, OrderId, Result, SealbookError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStore {
    orders: Vec<Order>,
    next_batch: BatchId,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            next_batch: BatchId(1),
        }
    }

    /// Append a freshly committed order and return its id.
    pub fn insert_committed(
        &mut self,
        owner: AccountId,
        commitment: Commitment,
        height: BlockHeight,
    ) -> OrderId {
        let id = self.next_order_id();
        self.orders
            .push(Order::committed(id, owner, commitment, height));
        id
    }

    /// The id the next commit will receive.
    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        OrderId(self.orders.len() as u64 + 1)
    }

    /// The marker the next successful batch will carry.
    #[must_use]
    pub fn next_batch_id(&self) -> BatchId {
        self.next_batch
    }

    /// Consume the next batch marker.
    pub fn advance_batch(&mut self) -> BatchId {
        let id = self.next_batch;
        self.next_batch = id.next();
        id
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        Self::index(id).and_then(|i| self.orders.get(i))
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        Self::index(id).and_then(|i| self.orders.get_mut(i))
    }

    /// Look up an order or fail with `OrderNotFound`.
    pub fn require(&self, id: OrderId) -> Result<&Order> {
        self.get(id).ok_or(SealbookError::OrderNotFound(id))
    }

    /// Overwrite a record wholesale. Used to restore snapshots on rollback.
    pub fn replace(&mut self, order: Order) -> Result<()> {
        let id = order.id;
        let slot = self.get_mut(id).ok_or(SealbookError::OrderNotFound(id))?;
        *slot = order;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn by_owner(&self, owner: AccountId) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.owner == owner)
    }

    /// Orders not yet in a terminal status.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| !o.status.is_terminal())
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Collateral the engine should hold in custody for `asset`:
    /// the sum of every order's remaining escrow in that asset.
    #[must_use]
    pub fn escrow_total(&self, asset: Asset) -> u128 {
        self.orders
            .iter()
            .filter_map(|o| o.terms.map(|t| (t, o.escrow)))
            .filter(|(terms, _)| terms.collateral().is_ok_and(|c| c.asset == asset))
            .map(|(_, escrow)| escrow)
            .fold(0u128, u128::saturating_add)
    }

    fn index(id: OrderId) -> Option<usize> {
        id.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}
