//! PIN service - the transaction PIN and the biometric gate
//!
//! Only the Argon2 hash of a PIN is ever held or persisted.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::PinHash;
use crate::store::{Action, Store};

pub struct PinService {
    store: Arc<Store>,
}

impl PinService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn require_user_id(&self) -> Result<String> {
        self.store
            .with_state(|s| s.auth.user().map(|u| u.id.clone()))
            .ok_or(Error::NotAuthenticated)
    }

    fn current_hash(&self) -> Option<PinHash> {
        self.store.with_state(|s| {
            let user = s.auth.user()?;
            s.app.pin_hash_for(&user.id).cloned()
        })
    }

    /// Set the signed-in user's transaction PIN
    ///
    /// Replacing an existing PIN requires `current` to match it.
    pub fn set_pin(&self, current: Option<&str>, pin: &str) -> Result<()> {
        let user_id = self.require_user_id()?;
        if let Some(existing) = self.current_hash() {
            let current = current.ok_or_else(|| Error::validation("Current PIN is required"))?;
            if !existing.verify(current)? {
                return Err(Error::validation("Incorrect PIN"));
            }
        }

        let hash = PinHash::create(pin)?;
        self.store.dispatch(Action::SetPinHash { user_id, hash });
        Ok(())
    }

    /// Whether the signed-in user has a PIN on this device
    pub fn has_pin(&self) -> bool {
        self.current_hash().is_some()
    }

    /// Check `pin` against the signed-in user's hash without changing state
    ///
    /// With no user or no PIN set, every PIN is rejected.
    pub fn check(&self, pin: &str) -> Result<bool> {
        match self.current_hash() {
            Some(hash) => hash.verify(pin),
            None => Ok(false),
        }
    }

    /// PIN entry screen: a correct PIN completes the biometric step
    pub fn verify_pin(&self, pin: &str) -> Result<()> {
        self.require_user_id()?;
        if !self.has_pin() {
            return Err(Error::Credential("No PIN has been set".to_string()));
        }
        if !self.check(pin)? {
            return Err(Error::validation("Incorrect PIN"));
        }
        self.store.dispatch(Action::SetBiometricsCompleted(true));
        Ok(())
    }

    /// Require PIN entry again
    pub fn reset_biometrics(&self) -> bool {
        self.store.dispatch(Action::ResetBiometrics)
    }

    pub fn has_completed_biometrics(&self) -> bool {
        self.store.with_state(|s| s.app.has_completed_biometrics())
    }
}
