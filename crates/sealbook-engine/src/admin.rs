//! Upgrade authorization and state hand-off.
//!
//! Replacing the engine logic must never lose or alter order records. The
//! old engine exports its [`EngineState`] (only to an authorized caller),
//! and the new engine resumes from it with [`Engine::from_state`].
//!
//! [`Engine::from_state`]: crate::Engine::from_state

use serde::{Deserialize, Serialize};
use sealbook_types::constants::VERSION;
use sealbook_types::{AccountId, Result, SealbookError};

use crate::OrderStore;

/// Decides who may take the engine's state for an upgrade.
pub trait UpgradeGate {
    /// # Errors
    /// `UpgradeNotAuthorized` if `caller` may not upgrade the engine.
    fn authorize_upgrade(&self, caller: &AccountId) -> Result<()>;
}

/// Single-administrator gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGate {
    pub admin: AccountId,
}

impl AdminGate {
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self { admin }
    }
}

impl UpgradeGate for AdminGate {
    fn authorize_upgrade(&self, caller: &AccountId) -> Result<()> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(SealbookError::UpgradeNotAuthorized { caller: *caller })
        }
    }
}

/// Everything an upgraded engine needs to carry on where the old one
/// stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    /// Version of the engine that exported the state.
    pub exported_by: String,
    pub store: OrderStore,
}

impl EngineState {
    #[must_use]
    pub fn new(store: OrderStore) -> Self {
        Self {
            exported_by: VERSION.to_string(),
            store,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_authorized() {
        let admin = AccountId::from_label("admin");
        let gate = AdminGate::new(admin);
        assert!(gate.authorize_upgrade(&admin).is_ok());

        let mallory = AccountId::from_label("mallory");
        assert!(matches!(
            gate.authorize_upgrade(&mallory),
            Err(SealbookError::UpgradeNotAuthorized { caller }) if caller == mallory
        ));
    }

    #[test]
    fn state_json_roundtrip() {
        let state = EngineState::new(OrderStore::new());
        let json = state.to_json().unwrap();
        let back = EngineState::from_json(&json).unwrap();
        assert_eq!(state, back);
        assert_eq!(back.exported_by, VERSION);
    }

    #[test]
    fn malformed_state_is_serialization_error() {
        assert!(matches!(
            EngineState::from_json("[]"),
            Err(SealbookError::Serialization(_))
        ));
    }
}
