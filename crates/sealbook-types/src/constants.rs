//! Protocol constants for the SealBook engine.
//!
//! These are part of the public contract surface: indexers and clients
//! rely on them to know when an order may be revealed and how far a
//! clearing price may stray from the reference.

/// Ordering positions (blocks) that must pass after a commit before the
/// order may be revealed or cleared.
pub const DEFAULT_REVEAL_DELAY_BLOCKS: u64 = 2;

/// Maximum number of order ids accepted by a single `execute_batch` call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// Allowed clearing-price deviation from the oracle, in basis points (±5%).
pub const DEFAULT_MAX_DEVIATION_BPS: u32 = 500;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Fractional digits of the engine's canonical price unit.
///
/// With the default of 0 an engine price of `1000` means 1000 quote units
/// per base unit, and a buy of `amount` locks `amount * price` quote units.
///
/// A buy always locks `amount * price` quote ledger units, whatever this
/// value is. With `price_decimals = d > 0` one quote ledger unit therefore
/// stands for `10^-d` quote, and the quote ledger must be denominated
/// accordingly.
pub const DEFAULT_PRICE_DECIMALS: u32 = 0;

/// Upper bound for `price_decimals` (`u128` holds ~38 decimal digits).
pub const MAX_PRICE_DECIMALS: u32 = 18;

/// Domain separator for order commitments.
pub const COMMITMENT_DOMAIN: &[u8] = b"sealbook:commitment:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SealBook";
