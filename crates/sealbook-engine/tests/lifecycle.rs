//! Commit, reveal and cancel across the engine and an in-memory ledger.

mod common;

use common::{Market, acct};
use sealbook_engine::CallContext;
use sealbook_types::{
    Asset, BlockHeight, EngineEvent, Nonce, OrderId, OrderSide, OrderStatus, SealbookError,
};

#[test]
fn reveal_with_matching_nonce_locks_quote() {
    // Scenario A: commit (100, 1000, buy, 123), reveal after the delay.
    let mut market = Market::new();
    let alice = acct("alice");
    market.fund(alice, Asset::Quote, 100_000);

    let id = market.commit(alice, OrderSide::Buy, 100, 1000, 123, 10);
    let ctx = CallContext::new(alice, 10 + market.delay());
    market
        .engine
        .reveal(&ctx, id, 100, 1000, OrderSide::Buy, &Nonce::from_u64(123))
        .unwrap();

    let order = market.order(id);
    assert_eq!(order.status, OrderStatus::Revealed);
    assert_eq!(order.escrow, 100 * 1000);
    assert_eq!(market.balance(alice, Asset::Quote), 0);
    assert_eq!(market.balance(market.custody(), Asset::Quote), 100_000);
    market.assert_custody_matches_escrow();
}

#[test]
fn reveal_with_wrong_nonce_is_invalid_commitment() {
    // Scenario B: same order, nonce 456.
    let mut market = Market::new();
    let alice = acct("alice");
    market.fund(alice, Asset::Quote, 100_000);

    let id = market.commit(alice, OrderSide::Buy, 100, 1000, 123, 10);
    let before = market.order(id);
    let ctx = CallContext::new(alice, 20);
    let err = market
        .engine
        .reveal(&ctx, id, 100, 1000, OrderSide::Buy, &Nonce::from_u64(456))
        .unwrap_err();

    assert_eq!(err, SealbookError::InvalidCommitment(id));
    assert_eq!(market.order(id), before);
    assert!(!market.order(id).is_revealed());
    assert_eq!(market.balance(alice, Asset::Quote), 100_000);
}

#[test]
fn reveal_with_altered_terms_is_invalid_commitment() {
    let mut market = Market::new();
    let alice = acct("alice");
    market.fund(alice, Asset::Quote, 1_000_000);
    let id = market.commit(alice, OrderSide::Buy, 100, 1000, 1, 0);
    let ctx = CallContext::new(alice, 5);
    let nonce = Nonce::from_u64(1);

    for (amount, price, side) in [
        (101, 1000, OrderSide::Buy),
        (100, 999, OrderSide::Buy),
        (100, 1000, OrderSide::Sell),
    ] {
        let err = market
            .engine
            .reveal(&ctx, id, amount, price, side, &nonce)
            .unwrap_err();
        assert!(matches!(err, SealbookError::InvalidCommitment(_)));
    }
}

#[test]
fn reveal_preconditions_fail_in_order_without_change() {
    let mut market = Market::new();
    let (alice, bob) = (acct("alice"), acct("bob"));
    market.fund(alice, Asset::Base, 50);
    let nonce = Nonce::from_u64(7);

    // Unknown id.
    let err = market
        .engine
        .reveal(&CallContext::new(alice, 5), OrderId(42), 5, 10, OrderSide::Sell, &nonce)
        .unwrap_err();
    assert_eq!(err, SealbookError::OrderNotFound(OrderId(42)));

    let id = market.commit(alice, OrderSide::Sell, 5, 10, 7, 10);
    let committed = market.order(id);

    // Wrong caller is reported before the delay.
    let err = market
        .engine
        .reveal(&CallContext::new(bob, 10), id, 5, 10, OrderSide::Sell, &nonce)
        .unwrap_err();
    assert!(matches!(err, SealbookError::NotOwner { caller, .. } if caller == bob));

    // Too early.
    let err = market
        .engine
        .reveal(&CallContext::new(alice, 11), id, 5, 10, OrderSide::Sell, &nonce)
        .unwrap_err();
    assert!(matches!(
        err,
        SealbookError::DelayNotElapsed {
            matures_at: BlockHeight(12),
            ..
        }
    ));
    assert_eq!(market.order(id), committed);
    assert_eq!(market.balance(alice, Asset::Base), 50);

    // Success, then a second reveal.
    let ctx = CallContext::new(alice, 12);
    market
        .engine
        .reveal(&ctx, id, 5, 10, OrderSide::Sell, &nonce)
        .unwrap();
    let revealed = market.order(id);
    let err = market
        .engine
        .reveal(&ctx, id, 5, 10, OrderSide::Sell, &nonce)
        .unwrap_err();
    assert_eq!(err, SealbookError::AlreadyRevealed(id));
    assert_eq!(market.order(id), revealed);
    assert_eq!(market.balance(alice, Asset::Base), 45);
}

#[test]
fn cancelled_order_cannot_be_revealed() {
    let mut market = Market::new();
    let alice = acct("alice");
    let id = market.commit(alice, OrderSide::Buy, 1, 1, 1, 0);
    market.engine.cancel(&CallContext::new(alice, 1), id).unwrap();

    let err = market
        .engine
        .reveal(&CallContext::new(alice, 5), id, 1, 1, OrderSide::Buy, &Nonce::from_u64(1))
        .unwrap_err();
    assert_eq!(err, SealbookError::Cancelled(id));
}

#[test]
fn zero_terms_are_rejected_after_hash_check() {
    let mut market = Market::new();
    let alice = acct("alice");
    let id = market.commit(alice, OrderSide::Buy, 0, 1000, 3, 0);
    let err = market
        .engine
        .reveal(&CallContext::new(alice, 5), id, 0, 1000, OrderSide::Buy, &Nonce::from_u64(3))
        .unwrap_err();
    assert!(matches!(err, SealbookError::InvalidOrderTerms { .. }));
    assert!(!market.order(id).is_revealed());
}

#[test]
fn sell_with_unrepresentable_notional_is_not_revealed() {
    let mut market = Market::new();
    let bob = acct("bob");
    market.fund(bob, Asset::Base, u128::MAX);
    let id = market.commit(bob, OrderSide::Sell, u128::MAX, 2, 4, 0);
    market.engine.drain_events();

    let err = market
        .engine
        .reveal(&CallContext::new(bob, 5), id, u128::MAX, 2, OrderSide::Sell, &Nonce::from_u64(4))
        .unwrap_err();
    assert!(matches!(err, SealbookError::ArithmeticOverflow { .. }));
    assert_eq!(market.order(id).status, OrderStatus::Committed);
    assert_eq!(market.balance(bob, Asset::Base), u128::MAX);
    assert!(market.engine.events().is_empty());
}

#[test]
fn reveal_without_allowance_is_transfer_failure() {
    let mut market = Market::new();
    let alice = acct("alice");
    // Balance but no approval for custody.
    market
        .engine
        .ledger_mut()
        .deposit(alice, Asset::Quote, 10_000)
        .unwrap();
    let id = market.commit(alice, OrderSide::Buy, 10, 1000, 1, 0);
    market.engine.drain_events();

    let err = market
        .engine
        .reveal(&CallContext::new(alice, 5), id, 10, 1000, OrderSide::Buy, &Nonce::from_u64(1))
        .unwrap_err();
    assert!(matches!(err, SealbookError::TransferFailed { .. }));

    let order = market.order(id);
    assert_eq!(order.status, OrderStatus::Committed);
    assert!(order.terms.is_none());
    assert_eq!(order.escrow, 0);
    assert!(market.engine.events().is_empty());
    assert_eq!(market.balance(alice, Asset::Quote), 10_000);
}

#[test]
fn cancel_revealed_buy_refunds_exact_lock() {
    let mut market = Market::new();
    let alice = acct("alice");
    let id = market.place(alice, OrderSide::Buy, 30, 1000, 1, 0);
    assert_eq!(market.balance(alice, Asset::Quote), 0);

    market.engine.cancel(&CallContext::new(alice, 3), id).unwrap();

    let order = market.order(id);
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.escrow, 0);
    assert_eq!(market.balance(alice, Asset::Quote), 30_000);
    assert_eq!(market.balance(market.custody(), Asset::Quote), 0);
    market.assert_custody_matches_escrow();
    assert_eq!(market.engine.open_order_count(), 0);
}

#[test]
fn cancel_revealed_sell_refunds_base() {
    let mut market = Market::new();
    let bob = acct("bob");
    let id = market.place(bob, OrderSide::Sell, 8, 990, 2, 0);
    market.engine.cancel(&CallContext::new(bob, 4), id).unwrap();
    assert_eq!(market.balance(bob, Asset::Base), 8);
}

#[test]
fn cancel_by_stranger_is_not_owner() {
    let mut market = Market::new();
    let id = market.place(acct("alice"), OrderSide::Sell, 8, 990, 2, 0);
    let err = market
        .engine
        .cancel(&CallContext::new(acct("mallory"), 4), id)
        .unwrap_err();
    assert!(matches!(err, SealbookError::NotOwner { .. }));
    assert_eq!(market.order(id).status, OrderStatus::Revealed);
}

#[test]
fn cancel_unknown_order_is_not_found() {
    let mut market = Market::new();
    let err = market
        .engine
        .cancel(&CallContext::new(acct("alice"), 1), OrderId(1))
        .unwrap_err();
    assert_eq!(err, SealbookError::OrderNotFound(OrderId(1)));
}

#[test]
fn cancel_after_partial_fill_is_rejected() {
    // Scenario E.
    let mut market = Market::new();
    let (alice, bob) = (acct("alice"), acct("bob"));
    let buy = market.place(alice, OrderSide::Buy, 100, 1000, 1, 0);
    let sell = market.place(bob, OrderSide::Sell, 40, 1000, 2, 0);
    market
        .engine
        .execute_batch(&common::keeper(5), &[buy, sell])
        .unwrap();
    assert_eq!(market.order(buy).filled, 40);

    let before = market.order(buy);
    let quote_before = market.balance(alice, Asset::Quote);
    let err = market
        .engine
        .cancel(&CallContext::new(alice, 6), buy)
        .unwrap_err();
    assert_eq!(
        err,
        SealbookError::PartiallyFilled {
            order_id: buy,
            filled: 40
        }
    );
    assert_eq!(market.order(buy), before);
    assert_eq!(market.balance(alice, Asset::Quote), quote_before);
}

#[test]
fn cancel_after_full_fill_is_rejected() {
    let mut market = Market::new();
    let (alice, bob) = (acct("alice"), acct("bob"));
    let buy = market.place(alice, OrderSide::Buy, 10, 1000, 1, 0);
    let sell = market.place(bob, OrderSide::Sell, 10, 1000, 2, 0);
    market
        .engine
        .execute_batch(&common::keeper(5), &[buy, sell])
        .unwrap();
    market.engine.drain_events();

    let before = market.order(sell);
    assert_eq!(before.status, OrderStatus::Filled);
    let quote_before = market.balance(bob, Asset::Quote);
    let base_before = market.balance(bob, Asset::Base);

    let err = market
        .engine
        .cancel(&CallContext::new(bob, 6), sell)
        .unwrap_err();
    assert_eq!(
        err,
        SealbookError::PartiallyFilled {
            order_id: sell,
            filled: 10
        }
    );
    assert_eq!(market.order(sell), before);
    assert_eq!(market.balance(bob, Asset::Quote), quote_before);
    assert_eq!(market.balance(bob, Asset::Base), base_before);
    assert!(market.engine.events().is_empty());
}

#[test]
fn events_follow_the_lifecycle() {
    let mut market = Market::new();
    let alice = acct("alice");
    let id = market.place(alice, OrderSide::Sell, 3, 1000, 9, 0);
    market.engine.cancel(&CallContext::new(alice, 5), id).unwrap();

    let events = market.engine.drain_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], EngineEvent::OrderCommitted { order_id, .. } if order_id == id));
    assert!(matches!(
        events[1],
        EngineEvent::OrderRevealed {
            amount: 3,
            price: 1000,
            side: OrderSide::Sell,
            ..
        }
    ));
    assert_eq!(events[2], EngineEvent::OrderCancelled { order_id: id });
    assert!(market.engine.events().is_empty());
}

#[test]
fn orders_by_owner_lists_only_theirs() {
    let mut market = Market::new();
    let (alice, bob) = (acct("alice"), acct("bob"));
    let a1 = market.commit(alice, OrderSide::Buy, 1, 1, 1, 0);
    market.commit(bob, OrderSide::Buy, 1, 1, 2, 0);
    let a2 = market.commit(alice, OrderSide::Sell, 1, 1, 3, 0);

    let ids: Vec<_> = market.engine.orders_by_owner(alice).map(|o| o.id).collect();
    assert_eq!(ids, vec![a1, a2]);
    assert_eq!(market.engine.open_order_count(), 3);
}
