//! # sealbook-types
//!
//! Shared types, errors, and configuration for the **SealBook** engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`BatchId`], [`AccountId`], [`BlockHeight`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderStatus`], [`OrderTerms`]
//! - **Commitments**: [`Commitment`], [`Nonce`]
//! - **Assets**: [`Asset`], [`Collateral`]
//! - **Events**: [`EngineEvent`]
//! - **Oracle readings**: [`OracleReading`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`SealbookError`] with `SB_ERR_` prefix codes
//! - **Constants**: protocol-wide limits and defaults

pub mod asset;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod oracle;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use sealbook_types::{Order, OrderSide, Commitment, ...};

pub use asset::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use oracle::*;
pub use order::*;

// Constants are accessed via `sealbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
