//! # sealbook-engine
//!
//! **Order lifecycle and batch clearing** for a single asset pair.
//!
//! Orders enter as sealed commitments, become tradable only after a
//! maturity delay, and settle in caller-assembled batches at one
//! volume-weighted price that must sit inside a band around an external
//! reference price.
//!
//! ## Order Flow
//!
//! ```text
//! commit(hash) ──[delay]──▶ reveal(terms, nonce) ──▶ execute_batch([ids]) ──▶ fills / close
//!        └──────────────── cancel (refund if revealed) ◀───┘
//! ```
//!
//! ## Modules
//!
//! 1. **store**: the single owned [`OrderStore`] (orders + counters)
//! 2. **lifecycle**: `commit`, `reveal`, `cancel`
//! 3. **clearing**: pure aggregation, VWAP price, oracle band, fill allocation
//! 4. **settlement**: payouts from custody for a cleared batch
//! 5. **batch**: `execute_batch`, tying clearing and settlement together
//! 6. **admin**: the upgrade gate and state hand-off
//!
//! Every mutating call is all-or-nothing: order records, events, and ledger
//! balances are either all updated or all left exactly as they were.

pub mod admin;
pub mod batch;
pub mod clearing;
pub mod context;
pub mod engine;
pub mod lifecycle;
pub mod settlement;
pub mod store;

pub use admin::{AdminGate, EngineState, UpgradeGate};
pub use batch::{BatchReport, FillReport};
pub use clearing::{BatchTotals, ClearingPlan, Fill, Participant, plan_batch};
pub use context::CallContext;
pub use engine::Engine;
pub use store::OrderStore;
