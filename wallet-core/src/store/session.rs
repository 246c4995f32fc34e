//! Session slice: who is logged in

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::User;

/// Authentication state
///
/// `is_authenticated` is derived from the presence of a user, so the two
/// can never disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    user: Option<User>,
    last_error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Sign in `user`, clearing any previous failure
    pub(crate) fn login_success(&mut self, user: User) -> bool {
        let next = Self {
            user: Some(user),
            last_error: None,
        };
        self.replace(next)
    }

    /// Record a failed attempt; an existing session is left alone
    pub(crate) fn login_failure(&mut self, message: String) -> bool {
        if self.last_error.as_deref() == Some(message.as_str()) {
            return false;
        }
        self.last_error = Some(message);
        true
    }

    /// Back to the empty initial state
    pub(crate) fn logout(&mut self) -> bool {
        self.replace(Self::default())
    }

    /// Refresh the balance snapshot of the signed-in user
    pub(crate) fn balance_updated(&mut self, balance: Decimal) -> bool {
        match self.user.as_mut() {
            Some(user) if user.balance != Some(balance) => {
                user.balance = Some(balance);
                true
            }
            _ => false,
        }
    }

    fn replace(&mut self, next: Self) -> bool {
        if *self == next {
            return false;
        }
        *self = next;
        true
    }

    pub(crate) fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            is_authenticated: self.is_authenticated(),
            user: self.user.clone(),
        }
    }

    /// Restore from storage; a flag without a user (or the reverse) is
    /// treated as signed out
    pub(crate) fn from_persisted(persisted: PersistedSession) -> Self {
        let user = match (persisted.is_authenticated, persisted.user) {
            (true, Some(user)) => Some(user),
            _ => None,
        };
        Self {
            user,
            last_error: None,
        }
    }
}

/// Stored shape of the session slice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedSession {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
}
