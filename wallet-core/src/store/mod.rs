//! Client-side state container
//!
//! A single [`Store`] owned by the application root holds every slice of
//! client state. Screens (or the CLI) read snapshots and dispatch
//! [`Action`]s; each action is applied synchronously, one at a time, and
//! subscribers are notified only when the state actually changed.
//!
//! - **session**: who is logged in
//! - **transactions**: cached transaction history
//! - **app**: per-user PIN hashes and the biometric gate
//! - **persist**: snapshot/rehydrate and the debounced writer

mod app;
pub mod persist;
mod session;
mod transactions;

use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;

use crate::domain::{PinHash, TransactionRecord, User};

pub use app::AppState;
pub use persist::{PersistConfig, Persister, Rehydrated, RehydrationOutcome, Slice};
pub use session::SessionState;
pub use transactions::TransactionState;

/// Every state transition the store understands
#[derive(Debug, Clone)]
pub enum Action {
    // Session
    LoginSuccess(User),
    LoginFailure(String),
    Logout,
    BalanceUpdated(Decimal),

    // Transactions
    SetTransactions(Vec<TransactionRecord>),
    SetLoading(bool),
    SetError(String),
    AddTransaction(TransactionRecord),
    ClearTransactions,

    // App
    SetPinHash { user_id: String, hash: PinHash },
    SetBiometricsCompleted(bool),
    ResetBiometrics,
}

/// The combined client state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub auth: SessionState,
    pub transactions: TransactionState,
    pub app: AppState,
}

impl RootState {
    /// Apply one action; returns whether anything changed
    pub fn reduce(&mut self, action: Action) -> bool {
        match action {
            Action::LoginSuccess(user) => self.auth.login_success(user),
            Action::LoginFailure(message) => self.auth.login_failure(message),
            Action::Logout => self.auth.logout(),
            Action::BalanceUpdated(balance) => self.auth.balance_updated(balance),

            Action::SetTransactions(records) => self.transactions.set_transactions(records),
            Action::SetLoading(flag) => self.transactions.set_loading(flag),
            Action::SetError(message) => self.transactions.set_error(message),
            Action::AddTransaction(record) => self.transactions.add_transaction(record),
            Action::ClearTransactions => self.transactions.clear(),

            Action::SetPinHash { user_id, hash } => self.app.set_pin_hash(user_id, hash),
            Action::SetBiometricsCompleted(flag) => self.app.set_biometrics_completed(flag),
            Action::ResetBiometrics => self.app.reset_biometrics(),
        }
    }

    pub fn route(&self) -> Route {
        Route::for_state(self)
    }
}

/// Which flow the UI should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Landing, login, signup and PIN entry
    Auth,
    /// Home tabs, top-up, withdraw, send money
    Main,
}

impl Route {
    pub fn for_state(state: &RootState) -> Self {
        if state.auth.is_authenticated() {
            Route::Main
        } else {
            Route::Auth
        }
    }
}

/// Single-writer state container with change notification
///
/// Built from an already rehydrated [`RootState`], so nothing can observe
/// the store before persisted state has been restored.
#[derive(Debug)]
pub struct Store {
    state: watch::Sender<RootState>,
    revision: AtomicU64,
}

impl Store {
    pub fn new(initial: RootState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            revision: AtomicU64::new(0),
        }
    }

    /// Apply an action; subscribers are woken only if the state changed
    pub fn dispatch(&self, action: Action) -> bool {
        let changed = self.state.send_if_modified(|state| state.reduce(action));
        if changed {
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        changed
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> RootState {
        self.state.borrow().clone()
    }

    /// Read the current state without copying it
    pub fn with_state<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Receiver woken after every effective change
    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.state.subscribe()
    }

    /// Number of effective changes since the store was created
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn route(&self) -> Route {
        self.with_state(Route::for_state)
    }

    /// Signed-in user, cloned
    pub fn current_user(&self) -> Option<User> {
        self.with_state(|s| s.auth.user().cloned())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(RootState::default())
    }
}
