//! Order commitments for the commit-reveal protocol.
//!
//! A trader first publishes only `SHA-256(domain || amount || price || side || nonce)`.
//! The order terms stay hidden until the reveal delay has passed, so whoever
//! orders transactions cannot react to them.
//!
//! Canonical encoding (all integers big-endian, left-padded to 32 bytes):
//!
//! ```text
//! "sealbook:commitment:v1:" || amount[32] || price[32] || side[1] || nonce[32]
//! ```
//!
//! `side` is `0x00` for buy and `0x01` for sell.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{OrderSide, constants};

/// Opaque 32-byte commitment to an order's hidden terms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Compute the commitment a trader must publish for the given terms.
    #[must_use]
    pub fn compute(amount: u128, price: u128, side: OrderSide, nonce: &Nonce) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::COMMITMENT_DOMAIN);
        hasher.update(word(amount));
        hasher.update(word(price));
        hasher.update(match side {
            OrderSide::Buy => [0u8],
            OrderSide::Sell => [1u8],
        });
        hasher.update(nonce.0);

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Self(hash)
    }

    /// Whether the given terms and nonce open this commitment.
    #[must_use]
    pub fn opens_with(&self, amount: u128, price: u128, side: OrderSide, nonce: &Nonce) -> bool {
        Self::compute(amount, price, side, nonce) == *self
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment(0x{})", hex::encode(&self.0[..8]))
    }
}

/// Secret blinding value chosen by the trader.
///
/// `Debug` never prints the value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Nonce(pub [u8; 32]);

impl Nonce {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Encode a small integer nonce as a 32-byte big-endian word.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(<redacted>)")
    }
}

fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}
