//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sealbook_engine::{AdminGate, CallContext, Engine};
use sealbook_ledger::{FaultyLedger, InMemoryLedger, Ledger, StaticOracle};
use sealbook_types::{
    AccountId, Asset, BlockHeight, Commitment, EngineConfig, Nonce, Order, OrderId, OrderSide,
};

pub const ORACLE_PRICE: i64 = 1000;

/// Ledgers the fixtures know how to fund.
pub trait Funding: Ledger {
    fn fund(&mut self, who: AccountId, custody: AccountId, asset: Asset, amount: u128);
}

impl Funding for InMemoryLedger {
    fn fund(&mut self, who: AccountId, custody: AccountId, asset: Asset, amount: u128) {
        self.deposit(who, asset, amount).unwrap();
        let allowed = self.allowance(who, custody, asset);
        self.approve(who, custody, asset, allowed.saturating_add(amount));
    }
}

impl Funding for FaultyLedger<InMemoryLedger> {
    fn fund(&mut self, who: AccountId, custody: AccountId, asset: Asset, amount: u128) {
        self.inner_mut().fund(who, custody, asset, amount);
    }
}

pub fn acct(label: &str) -> AccountId {
    AccountId::from_label(label)
}

pub fn admin() -> AccountId {
    acct("admin")
}

/// An engine plus the helpers to drive it through whole order lifecycles.
pub struct Market<L: Funding = InMemoryLedger> {
    pub engine: Engine<L, StaticOracle>,
}

impl Market<InMemoryLedger> {
    pub fn new() -> Self {
        Self::with(EngineConfig::default(), InMemoryLedger::new())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with(config, InMemoryLedger::new())
    }
}

impl Market<FaultyLedger<InMemoryLedger>> {
    pub fn faulty() -> Self {
        Self::with(
            EngineConfig::default(),
            FaultyLedger::new(InMemoryLedger::new()),
        )
    }
}

impl<L: Funding> Market<L> {
    pub fn with(config: EngineConfig, ledger: L) -> Self {
        let oracle = StaticOracle::new(Decimal::new(ORACLE_PRICE, 0), BlockHeight(0));
        let engine = Engine::new(config, ledger, oracle, AdminGate::new(admin())).unwrap();
        Self { engine }
    }

    pub fn custody(&self) -> AccountId {
        self.engine.custody()
    }

    pub fn delay(&self) -> u64 {
        self.engine.config().reveal_delay
    }

    pub fn fund(&mut self, who: AccountId, asset: Asset, amount: u128) {
        let custody = self.custody();
        self.engine.ledger_mut().fund(who, custody, asset, amount);
    }

    pub fn set_oracle(&mut self, price: Decimal, updated_at: u64) {
        self.engine
            .oracle_mut()
            .set_price(price, BlockHeight(updated_at));
    }

    pub fn balance(&self, who: AccountId, asset: Asset) -> u128 {
        self.engine.ledger().balance_of(asset, who)
    }

    pub fn commit(
        &mut self,
        who: AccountId,
        side: OrderSide,
        amount: u128,
        price: u128,
        nonce: u64,
        height: u64,
    ) -> OrderId {
        let commitment = Commitment::compute(amount, price, side, &Nonce::from_u64(nonce));
        self.engine
            .commit(&CallContext::new(who, height), commitment)
    }

    /// Fund exactly the collateral needed, then commit and reveal at
    /// maturity.
    pub fn place(
        &mut self,
        who: AccountId,
        side: OrderSide,
        amount: u128,
        price: u128,
        nonce: u64,
        height: u64,
    ) -> OrderId {
        match side {
            OrderSide::Buy => self.fund(who, Asset::Quote, amount * price),
            OrderSide::Sell => self.fund(who, Asset::Base, amount),
        }
        let id = self.commit(who, side, amount, price, nonce, height);
        let ctx = CallContext::new(who, height + self.delay());
        self.engine
            .reveal(&ctx, id, amount, price, side, &Nonce::from_u64(nonce))
            .unwrap();
        id
    }

    pub fn order(&self, id: OrderId) -> Order {
        self.engine.order(id).cloned().unwrap()
    }

    pub fn orders(&self, ids: &[OrderId]) -> Vec<Order> {
        ids.iter().map(|id| self.order(*id)).collect()
    }

    /// Custody must hold exactly the escrow the store accounts for.
    pub fn assert_custody_matches_escrow(&self) {
        for asset in [Asset::Base, Asset::Quote] {
            assert_eq!(
                self.balance(self.custody(), asset),
                self.engine.escrow_total(asset),
                "custody/escrow mismatch for {asset}"
            );
        }
    }
}

pub fn keeper(height: u64) -> CallContext {
    CallContext::new(acct("keeper"), height)
}
