//! # sealbook-ledger
//!
//! **Collaborator ports** the engine consumes, plus in-memory
//! implementations for tests, simulations, and single-process deployments.
//!
//! ## Architecture
//!
//! 1. **Ledger**: holds balances; `transfer`, delegated `transfer_from`,
//!    `balance_of`. Every call may fail and the engine treats any failure
//!    as fatal for the enclosing operation.
//! 2. **PriceOracle**: the independent reference price used to bound
//!    clearing prices.
//! 3. **InMemoryLedger**: per-(account, asset) balances with ERC-20 style
//!    allowances and a supply conservation check.
//! 4. **SupplyConservation**: `Σ balances == Σ deposits − Σ withdrawals`.

#[cfg(any(test, feature = "test-helpers"))]
pub mod faulty;
pub mod ledger;
pub mod memory;
pub mod oracle;
pub mod supply_conservation;

#[cfg(any(test, feature = "test-helpers"))]
pub use faulty::FaultyLedger;
pub use ledger::Ledger;
pub use memory::InMemoryLedger;
pub use oracle::{PriceOracle, StaticOracle};
pub use supply_conservation::SupplyConservation;
