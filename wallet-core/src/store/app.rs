//! App slice: PINs and biometric gate
//!
//! PIN hashes are kept per user id and survive logout, so a PIN only ever
//! gates the account it was set for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PinHash;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    has_completed_biometrics: bool,
    pin_hashes: BTreeMap<String, PinHash>,
}

impl AppState {
    pub fn has_completed_biometrics(&self) -> bool {
        self.has_completed_biometrics
    }

    /// PIN hash of `user_id`, if that user has set one on this device
    pub fn pin_hash_for(&self, user_id: &str) -> Option<&PinHash> {
        self.pin_hashes.get(user_id)
    }

    pub fn has_pin_for(&self, user_id: &str) -> bool {
        self.pin_hashes.contains_key(user_id)
    }

    pub(crate) fn set_pin_hash(&mut self, user_id: String, pin_hash: PinHash) -> bool {
        if self.pin_hashes.get(&user_id) == Some(&pin_hash) {
            return false;
        }
        self.pin_hashes.insert(user_id, pin_hash);
        true
    }

    pub(crate) fn set_biometrics_completed(&mut self, completed: bool) -> bool {
        if self.has_completed_biometrics == completed {
            return false;
        }
        self.has_completed_biometrics = completed;
        true
    }

    /// Require the PIN step again; PINs are kept
    pub(crate) fn reset_biometrics(&mut self) -> bool {
        self.set_biometrics_completed(false)
    }

    pub(crate) fn to_persisted(&self) -> PersistedApp {
        PersistedApp {
            has_completed_biometrics: self.has_completed_biometrics,
            pin_hashes: self.pin_hashes.clone(),
        }
    }

    pub(crate) fn from_persisted(persisted: PersistedApp) -> Self {
        Self {
            has_completed_biometrics: persisted.has_completed_biometrics,
            pin_hashes: persisted.pin_hashes,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedApp {
    #[serde(default)]
    pub has_completed_biometrics: bool,
    #[serde(default)]
    pub pin_hashes: BTreeMap<String, PinHash>,
}
