//! Per-call context supplied by the execution platform.

use sealbook_types::{AccountId, BlockHeight};

/// Who is calling and at which ordering position.
///
/// The platform authenticates `caller`; the engine trusts it as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    pub height: BlockHeight,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: AccountId, height: u64) -> Self {
        Self {
            caller,
            height: BlockHeight(height),
        }
    }

    /// Same caller, different position.
    #[must_use]
    pub fn at(self, height: u64) -> Self {
        Self {
            height: BlockHeight(height),
            ..self
        }
    }
}
