//! The engine: one owned store, the collaborators, and the event journal.
//!
//! Every mutating operation goes through [`Engine::atomically`], which
//! opens a ledger scope, remembers the prior version of every order record
//! it touches, and stages events. On success the scope is committed and the
//! events published; on failure the ledger scope is reverted, the records
//! restored, and the staged events dropped.

use sealbook_ledger::{Ledger, PriceOracle};
use sealbook_types::{
    AccountId, Asset, EngineConfig, EngineEvent, Order, OrderId, Result, SealbookError,
};

use crate::{AdminGate, CallContext, EngineState, OrderStore, UpgradeGate};

/// Commit-reveal batch clearing engine for one market.
///
/// `&mut self` on every mutating call serializes access: a ledger
/// implementation has no way back into the engine while a call is running.
#[derive(Debug)]
pub struct Engine<L, O, G = AdminGate> {
    pub(crate) config: EngineConfig,
    pub(crate) store: OrderStore,
    pub(crate) ledger: L,
    pub(crate) oracle: O,
    gate: G,
    events: Vec<EngineEvent>,
}

/// Rollback information for the call in flight.
#[derive(Debug, Default)]
pub(crate) struct Staged {
    touched: Vec<Order>,
    events: Vec<EngineEvent>,
}

impl Staged {
    /// Remember `order` as it was before this call first modified it.
    pub(crate) fn touch(&mut self, order: &Order) {
        if !self.touched.iter().any(|o| o.id == order.id) {
            self.touched.push(order.clone());
        }
    }

    pub(crate) fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }
}

impl<L: Ledger, O: PriceOracle, G: UpgradeGate> Engine<L, O, G> {
    /// Start an engine with an empty store.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: EngineConfig, ledger: L, oracle: O, gate: G) -> Result<Self> {
        Self::from_state(config, EngineState::new(OrderStore::new()), ledger, oracle, gate)
    }

    /// Resume from state exported by a previous engine.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn from_state(
        config: EngineConfig,
        state: EngineState,
        ledger: L,
        oracle: O,
        gate: G,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            market = %config.market,
            orders = state.store.len(),
            exported_by = %state.exported_by,
            reveal_delay = config.reveal_delay,
            max_batch_size = config.max_batch_size,
            max_deviation_bps = config.max_deviation_bps,
            "engine started"
        );
        Ok(Self {
            config,
            store: state.store,
            ledger,
            oracle,
            gate,
            events: Vec::new(),
        })
    }

    /// Hand the stored state to an authorized upgrader.
    ///
    /// # Errors
    /// `UpgradeNotAuthorized` if the gate rejects `ctx.caller`.
    pub fn export_state(&self, ctx: &CallContext) -> Result<EngineState> {
        if let Err(err) = self.gate.authorize_upgrade(&ctx.caller) {
            tracing::warn!(caller = %ctx.caller, "state export refused");
            return Err(err);
        }
        tracing::info!(caller = %ctx.caller, orders = self.store.len(), "state exported");
        Ok(EngineState::new(self.store.clone()))
    }

    /// Tear down the engine and return its state, gated like
    /// [`export_state`](Self::export_state). The collaborators are handed
    /// back so the successor can take them over.
    ///
    /// # Errors
    /// `UpgradeNotAuthorized` if the gate rejects `ctx.caller`.
    pub fn into_state(self, ctx: &CallContext) -> Result<(EngineState, L, O)> {
        let state = self.export_state(ctx)?;
        Ok((state, self.ledger, self.oracle))
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.config.custody
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    #[must_use]
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Look up an order. Closed orders stay readable with their terminal
    /// status.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.store.get(id)
    }

    pub fn orders_by_owner(&self, owner: AccountId) -> impl Iterator<Item = &Order> {
        self.store.by_owner(owner)
    }

    #[must_use]
    pub fn open_order_count(&self) -> usize {
        self.store.open_count()
    }

    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        self.store.next_order_id()
    }

    /// Collateral the store says custody should hold for `asset`.
    #[must_use]
    pub fn escrow_total(&self, asset: Asset) -> u128 {
        self.store.escrow_total(asset)
    }

    /// Published events not yet drained.
    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take every published event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn publish(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Run `op` all-or-nothing.
    pub(crate) fn atomically<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Self, &mut Staged) -> Result<T>,
    ) -> Result<T> {
        let mut staged = Staged::default();
        self.ledger.begin_scope();
        match f(self, &mut staged) {
            Ok(value) => {
                self.ledger.commit_scope();
                self.events.append(&mut staged.events);
                Ok(value)
            }
            Err(err) => {
                self.ledger.revert_scope();
                for order in staged.touched.into_iter().rev() {
                    let id = order.id;
                    if let Err(restore_err) = self.store.replace(order) {
                        tracing::error!(%id, error = %restore_err, "failed to restore order");
                    }
                }
                tracing::warn!(op, error = %err, "call rolled back");
                Err(err)
            }
        }
    }
}

/// Map a ledger failure onto the engine's transfer error.
pub(crate) fn transfer_failed(err: SealbookError) -> SealbookError {
    match err {
        SealbookError::TransferFailed { .. } => err,
        other => SealbookError::TransferFailed {
            reason: other.to_string(),
        },
    }
}
