//! Persistence and rehydration
//!
//! The whitelisted slices are written as one JSON document under a fixed
//! root key:
//! ```json
//! {
//!   "auth": { "isAuthenticated": true, "user": { ... } },
//!   "transactions": { "transactions": [ ... ] },
//!   "app": { "hasCompletedBiometrics": false, "pinHashes": { "<user id>": "$argon2id$..." } }
//! }
//! ```
//! Loading never fails: a missing, unreadable or corrupt document (or a
//! single corrupt slice) falls back to the empty initial state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::app::{AppState, PersistedApp};
use super::session::{PersistedSession, SessionState};
use super::transactions::{PersistedTransactions, TransactionState};
use super::{RootState, Store};
use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStorage;

/// Default storage key for the combined snapshot
pub const DEFAULT_ROOT_KEY: &str = "root";

/// Default quiet period before a burst of changes is written
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// A persistable slice of [`RootState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slice {
    Auth,
    Transactions,
    App,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::Auth, Slice::Transactions, Slice::App];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Auth => "auth",
            Slice::Transactions => "transactions",
            Slice::App => "app",
        }
    }
}

/// What gets persisted, where, and how often
#[derive(Debug, Clone, PartialEq)]
pub struct PersistConfig {
    pub key: String,
    pub whitelist: Vec<Slice>,
    pub debounce: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_ROOT_KEY.to_string(),
            whitelist: Slice::ALL.to_vec(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl PersistConfig {
    pub fn persists(&self, slice: Slice) -> bool {
        self.whitelist.contains(&slice)
    }
}

/// Stored document; each slice is kept as raw JSON so one bad slice
/// doesn't take the others down with it
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedRoot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transactions: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app: Option<JsonValue>,
}

/// How rehydration went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RehydrationOutcome {
    /// Nothing stored yet
    Empty,
    /// Stored snapshot applied
    Restored,
    /// Stored value unusable; the listed problems were ignored
    Recovered(Vec<String>),
}

/// Result of [`rehydrate`]: the state to boot with and what happened
#[derive(Debug, Clone)]
pub struct Rehydrated {
    pub state: RootState,
    pub outcome: RehydrationOutcome,
}

/// Serialize the whitelisted slices of `state`
pub fn snapshot_json(state: &RootState, config: &PersistConfig) -> Result<String> {
    let mut root = PersistedRoot::default();
    if config.persists(Slice::Auth) {
        root.auth = Some(serde_json::to_value(state.auth.to_persisted())?);
    }
    if config.persists(Slice::Transactions) {
        root.transactions = Some(serde_json::to_value(state.transactions.to_persisted())?);
    }
    if config.persists(Slice::App) {
        root.app = Some(serde_json::to_value(state.app.to_persisted())?);
    }
    Ok(serde_json::to_string(&root)?)
}

fn restore_slice<P, S>(
    raw: Option<JsonValue>,
    slice: Slice,
    config: &PersistConfig,
    problems: &mut Vec<String>,
    restore: impl FnOnce(P) -> S,
) -> S
where
    P: for<'de> Deserialize<'de>,
    S: Default,
{
    let Some(raw) = raw.filter(|_| config.persists(slice)) else {
        return S::default();
    };
    match serde_json::from_value::<P>(raw) {
        Ok(persisted) => restore(persisted),
        Err(e) => {
            problems.push(format!("{}: {}", slice.as_str(), e));
            S::default()
        }
    }
}

/// Rebuild state from a stored document
pub fn state_from_json(raw: &str, config: &PersistConfig) -> Rehydrated {
    let root: PersistedRoot = match serde_json::from_str(raw) {
        Ok(root) => root,
        Err(e) => {
            return Rehydrated {
                state: RootState::default(),
                outcome: RehydrationOutcome::Recovered(vec![format!("snapshot: {}", e)]),
            }
        }
    };

    let mut problems = Vec::new();
    let state = RootState {
        auth: restore_slice::<PersistedSession, _>(
            root.auth,
            Slice::Auth,
            config,
            &mut problems,
            SessionState::from_persisted,
        ),
        transactions: restore_slice::<PersistedTransactions, _>(
            root.transactions,
            Slice::Transactions,
            config,
            &mut problems,
            TransactionState::from_persisted,
        ),
        app: restore_slice::<PersistedApp, _>(
            root.app,
            Slice::App,
            config,
            &mut problems,
            AppState::from_persisted,
        ),
    };

    let outcome = if problems.is_empty() {
        RehydrationOutcome::Restored
    } else {
        RehydrationOutcome::Recovered(problems)
    };
    Rehydrated { state, outcome }
}

/// Load persisted state; never fails
pub fn rehydrate(storage: &dyn KeyValueStorage, config: &PersistConfig) -> Rehydrated {
    match storage.get_item(&config.key) {
        Ok(Some(raw)) => state_from_json(&raw, config),
        Ok(None) => Rehydrated {
            state: RootState::default(),
            outcome: RehydrationOutcome::Empty,
        },
        Err(e) => Rehydrated {
            state: RootState::default(),
            outcome: RehydrationOutcome::Recovered(vec![e.to_string()]),
        },
    }
}

/// Write the current state immediately
pub fn persist_now(store: &Store, storage: &dyn KeyValueStorage, config: &PersistConfig) -> Result<()> {
    let json = store.with_state(|state| snapshot_json(state, config))?;
    storage.set_item(&config.key, &json)
}

/// Background writer subscribed to store changes
///
/// Changes arriving within `debounce` of each other are coalesced into a
/// single write of the latest state.
pub struct Persister {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<()>>,
    writes: Arc<AtomicUsize>,
}

impl Persister {
    /// Start persisting `store` into `storage`; must be called inside a
    /// tokio runtime
    pub fn spawn(store: &Store, storage: Arc<dyn KeyValueStorage>, config: PersistConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let writes = Arc::new(AtomicUsize::new(0));
        let rx = store.subscribe();
        let handle = tokio::spawn(run_writer(
            rx,
            storage,
            config,
            shutdown_rx,
            Arc::clone(&writes),
        ));

        Self {
            shutdown: Some(shutdown_tx),
            handle,
            writes,
        }
    }

    /// Number of snapshots written so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Write any pending change and stop; returns the last write error
    pub async fn flush(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::storage(format!("Persistence task failed: {}", e))),
        }
    }
}

fn write_latest(
    rx: &mut watch::Receiver<RootState>,
    storage: &dyn KeyValueStorage,
    config: &PersistConfig,
    writes: &AtomicUsize,
) -> Result<()> {
    let json = {
        let state = rx.borrow_and_update();
        snapshot_json(&state, config)?
    };
    storage.set_item(&config.key, &json)?;
    writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

async fn run_writer(
    mut rx: watch::Receiver<RootState>,
    storage: Arc<dyn KeyValueStorage>,
    config: PersistConfig,
    mut shutdown: oneshot::Receiver<()>,
    writes: Arc<AtomicUsize>,
) -> Result<()> {
    let mut last_result = Ok(());

    loop {
        // Wait for the first change of a burst
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return last_result;
                }
            }
            _ = &mut shutdown => {
                if rx.has_changed().unwrap_or(false) {
                    last_result = write_latest(&mut rx, storage.as_ref(), &config, &writes);
                }
                return last_result;
            }
        }

        // Quiet period: every further change restarts the timer
        let mut stopping = false;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(config.debounce) => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        stopping = true;
                        break;
                    }
                }
                _ = &mut shutdown => {
                    stopping = true;
                    break;
                }
            }
        }

        last_result = write_latest(&mut rx, storage.as_ref(), &config, &writes);
        if stopping {
            return last_result;
        }
    }
}
