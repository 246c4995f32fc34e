//! Auth service - login, signup and logout flows

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::validation::{validate_password, validate_phone_number};
use crate::domain::{PinHash, SignupForm, User};
use crate::ports::{LoginRequest, SignupRequest, WalletApi};
use crate::store::{Action, Store};

pub struct AuthService {
    store: Arc<Store>,
    api: Arc<dyn WalletApi>,
}

impl AuthService {
    pub fn new(store: Arc<Store>, api: Arc<dyn WalletApi>) -> Self {
        Self { store, api }
    }

    /// Log in with phone number and password
    ///
    /// Invalid input is rejected without touching the store. A rejected or
    /// failed request is recorded as a login failure and returned.
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<User> {
        validate_phone_number(phone_number)?;
        validate_password(password)?;

        let request = LoginRequest {
            phone_number: phone_number.to_string(),
            password: password.to_string(),
        };

        match self.api.login(&request).await {
            Ok(user) => {
                self.store.dispatch(Action::LoginSuccess(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.store.dispatch(Action::LoginFailure(e.to_string()));
                Err(e)
            }
        }
    }

    /// Register a new account
    ///
    /// The PIN is hashed locally, never sent, and kept for the new user's
    /// id. The new user is not signed in; they log in afterwards like
    /// everyone else.
    pub async fn signup(&self, form: &SignupForm) -> Result<User> {
        form.validate()?;
        let pin_hash = PinHash::create(&form.pin)?;

        let request = SignupRequest {
            name: form.name.trim().to_string(),
            phone_number: form.phone_number.clone(),
            password: form.password.clone(),
        };
        let user = self.api.signup(&request).await?;

        self.store.dispatch(Action::SetPinHash {
            user_id: user.id.clone(),
            hash: pin_hash,
        });
        Ok(user)
    }

    /// Sign out and drop everything cached for the session
    ///
    /// PINs stay on the device for their owners; only the biometric step
    /// is reset. Returns false when there was nothing to clear.
    pub fn logout(&self) -> bool {
        let mut changed = self.store.dispatch(Action::Logout);
        changed |= self.store.dispatch(Action::ClearTransactions);
        changed |= self.store.dispatch(Action::ResetBiometrics);
        changed
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.current_user()
    }
}
