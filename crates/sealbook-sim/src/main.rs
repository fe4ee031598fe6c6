//! SealBook simulator.
//!
//! Drives one buy and one sell through commit, reveal and a batch against
//! an in-memory ledger and a fixed oracle, then prints the batch report
//! and the event journal as JSON.
//!
//! ```text
//! sealbook-sim [CONFIG.json] [--price N] [--oracle N]
//! ```
//!
//! Logging follows `RUST_LOG` (default: engine and ledger at `debug`). Set
//! `SEALBOOK_LOG_JSON=1` for JSON log lines.

use rust_decimal::Decimal;
use sealbook_engine::{AdminGate, CallContext, Engine};
use sealbook_ledger::{InMemoryLedger, Ledger, StaticOracle};
use sealbook_types::{
    AccountId, Asset, BlockHeight, Commitment, EngineConfig, Nonce, OrderSide, Result,
    SealbookError, constants,
};

struct Args {
    config_path: Option<String>,
    price: u128,
    oracle: Decimal,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: None,
        price: 1000,
        oracle: Decimal::new(1000, 0),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--price" => {
                let value = iter.next().unwrap_or_default();
                args.price = value
                    .parse()
                    .map_err(|_| SealbookError::Configuration(format!("bad --price {value:?}")))?;
            }
            "--oracle" => {
                let value = iter.next().unwrap_or_default();
                args.oracle = value
                    .parse()
                    .map_err(|_| SealbookError::Configuration(format!("bad --oracle {value:?}")))?;
            }
            path => args.config_path = Some(path.to_string()),
        }
    }
    Ok(args)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let json = std::env::var("SEALBOOK_LOG_JSON").is_ok_and(|v| v == "1");
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "sealbook_sim=info,sealbook_engine=debug,sealbook_ledger=debug".into()
                }),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| SealbookError::Configuration(format!("{path}: {e}")))?;
            EngineConfig::from_json_str(&raw)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;
    let config = load_config(args.config_path.as_deref())?;
    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        market = %config.market,
        "starting simulation"
    );

    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");
    let amount: u128 = 100;
    let notional = amount
        .checked_mul(args.price)
        .ok_or(SealbookError::ArithmeticOverflow { context: "sim notional" })?;

    let mut ledger = InMemoryLedger::new();
    ledger.deposit(alice, Asset::Quote, notional)?;
    ledger.deposit(bob, Asset::Base, amount)?;
    ledger.approve(alice, config.custody, Asset::Quote, notional);
    ledger.approve(bob, config.custody, Asset::Base, amount);

    let delay = config.reveal_delay;
    let oracle = StaticOracle::new(args.oracle, BlockHeight(0));
    let admin = AccountId::from_label("admin");
    let mut engine = Engine::new(config, ledger, oracle, AdminGate::new(admin))?;

    let commit_at = 1;
    let buy_nonce = Nonce::from_u64(123);
    let sell_nonce = Nonce::from_u64(456);
    let buy = engine.commit(
        &CallContext::new(alice, commit_at),
        Commitment::compute(amount, args.price, OrderSide::Buy, &buy_nonce),
    );
    let sell = engine.commit(
        &CallContext::new(bob, commit_at),
        Commitment::compute(amount, args.price, OrderSide::Sell, &sell_nonce),
    );

    let reveal_at = commit_at + delay;
    engine.reveal(
        &CallContext::new(alice, reveal_at),
        buy,
        amount,
        args.price,
        OrderSide::Buy,
        &buy_nonce,
    )?;
    engine.reveal(
        &CallContext::new(bob, reveal_at),
        sell,
        amount,
        args.price,
        OrderSide::Sell,
        &sell_nonce,
    )?;

    let keeper = CallContext::new(AccountId::from_label("keeper"), reveal_at + 1);
    let report = engine.execute_batch(&keeper, &[buy, sell])?;

    for asset in [Asset::Base, Asset::Quote] {
        engine.ledger().verify_supply(asset)?;
        tracing::info!(
            %asset,
            alice = engine.ledger().balance_of(asset, alice),
            bob = engine.ledger().balance_of(asset, bob),
            custody = engine.ledger().balance_of(asset, engine.custody()),
            "final balances"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    for event in engine.drain_events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
