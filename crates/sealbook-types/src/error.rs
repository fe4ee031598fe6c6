//! Error types for the SealBook engine.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order lifecycle errors (commit / reveal / cancel)
//! - 2xx: Ledger errors
//! - 3xx: Batch clearing errors
//! - 4xx: Oracle errors
//! - 5xx: Administration errors
//! - 9xx: General / internal errors
//!
//! Every error aborts the enclosing call with no state change.

use thiserror::Error;

use crate::{AccountId, BlockHeight, OrderId};

/// Central error enum for all SealBook operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealbookError {
    // =================================================================
    // Order Lifecycle Errors (1xx)
    // =================================================================
    /// No order was ever committed under this id.
    #[error("SB_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The caller does not own the order.
    #[error("SB_ERR_101: Caller {caller} does not own {order_id}")]
    NotOwner { order_id: OrderId, caller: AccountId },

    /// The order terms have already been revealed.
    #[error("SB_ERR_102: Order already revealed: {0}")]
    AlreadyRevealed(OrderId),

    /// The order was cancelled and can no longer be revealed.
    #[error("SB_ERR_103: Order is cancelled: {0}")]
    Cancelled(OrderId),

    /// The maturity delay since commit has not elapsed.
    #[error("SB_ERR_104: Delay not elapsed for {order_id}: matures at {matures_at}, now {current}")]
    DelayNotElapsed {
        order_id: OrderId,
        matures_at: BlockHeight,
        current: BlockHeight,
    },

    /// The revealed terms do not hash to the stored commitment.
    #[error("SB_ERR_105: Revealed terms do not match commitment of {0}")]
    InvalidCommitment(OrderId),

    /// The order was already cancelled.
    #[error("SB_ERR_106: Order already cancelled: {0}")]
    AlreadyCancelled(OrderId),

    /// The order has fills and can no longer be cancelled.
    #[error("SB_ERR_107: Order {order_id} has {filled} filled and cannot be cancelled")]
    PartiallyFilled { order_id: OrderId, filled: u128 },

    /// The revealed terms are unusable (zero amount or price).
    #[error("SB_ERR_108: Invalid order terms: {reason}")]
    InvalidOrderTerms { reason: String },

    // =================================================================
    // Ledger Errors (2xx)
    // =================================================================
    /// A ledger transfer failed; the enclosing call was rolled back.
    #[error("SB_ERR_200: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// Not enough balance for a transfer.
    #[error("SB_ERR_201: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    /// Not enough allowance for a delegated transfer.
    #[error("SB_ERR_202: Insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: u128, allowed: u128 },

    /// Supply conservation invariant violated. Critical safety alert.
    #[error("SB_ERR_203: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Batch Clearing Errors (3xx)
    // =================================================================
    /// More ids than the engine accepts in one batch.
    #[error("SB_ERR_300: Batch too large: {size} orders, max {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// An order in the batch is not revealed, cancelled, or immature.
    #[error("SB_ERR_301: Order {order_id} not eligible for clearing: {reason}")]
    OrderNotEligible { order_id: OrderId, reason: String },

    /// The batch has no open volume on at least one side.
    #[error("SB_ERR_302: No valid orders: batch needs open volume on both sides")]
    NoValidOrders,

    /// The clearing price is outside the allowed band around the oracle.
    #[error(
        "SB_ERR_303: Clearing price {clearing_price} deviates from reference {reference_price} by more than {max_deviation_bps} bps"
    )]
    PriceDeviation {
        clearing_price: u128,
        reference_price: u128,
        max_deviation_bps: u32,
    },

    /// The same id appears more than once in a batch.
    #[error("SB_ERR_304: Order listed twice in batch: {0}")]
    DuplicateOrderInBatch(OrderId),

    /// The clearing price is worse than an order's limit price.
    #[error("SB_ERR_305: Clearing price {clearing_price} violates limit {limit} of {order_id}")]
    LimitPriceViolated {
        order_id: OrderId,
        limit: u128,
        clearing_price: u128,
    },

    // =================================================================
    // Oracle Errors (4xx)
    // =================================================================
    /// The oracle reading is non-positive, unrepresentable, or stale.
    #[error("SB_ERR_400: Invalid oracle reading: {reason}")]
    InvalidOracle { reason: String },

    // =================================================================
    // Administration Errors (5xx)
    // =================================================================
    /// The caller may not hand off engine state for an upgrade.
    #[error("SB_ERR_500: Upgrade not authorized for {caller}")]
    UpgradeNotAuthorized { caller: AccountId },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, out-of-range values, etc.).
    #[error("SB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Checked integer arithmetic overflowed.
    #[error("SB_ERR_903: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SealbookError>;

impl From<serde_json::Error> for SealbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
